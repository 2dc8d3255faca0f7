/// Chart-X units per day on the half-minute time axis (24h * 120 units/h)
pub const DAY_LENGTH: f64 = 2880.0;

/// Upper bound on stations visited by one route walk
pub const MAX_WALK_STEPS: usize = 200;

/// Collections with fewer samples than this are not drawn on a line
pub const MIN_LINE_SAMPLES: usize = 3;

/// Minimum points for a drawable polyline
pub const MIN_SEGMENT_POINTS: usize = 2;

/// Station id used in timetables to mark the end of a round trip
pub const LOOP_CLOSE_STATION: &str = "1001";

/// Placeholder id for non-serviced stations on a line axis
pub const NON_SERVICED_STATION: &str = "NA";

/// Style key used for car classes without a mapping
pub const DEFAULT_STYLE: &str = "others";

/// Hours printed along the top of the diagram, starting at 04:00 and running
/// into the next morning
pub const DIAGRAM_HOURS: [u32; 27] = [
    4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 1, 2, 3, 4, 5, 6,
];

/// Display names for the operational lines
pub const LINE_NAMES: &[(&str, &str)] = &[
    ("LINE_WN", "西部幹線北段"),
    ("LINE_WS", "西部幹線南段"),
    ("LINE_WM", "西部幹線山線"),
    ("LINE_WSEA", "西部幹線海線"),
    ("LINE_P", "屏東線"),
    ("LINE_S", "南迴線"),
    ("LINE_T", "台東線"),
    ("LINE_PX", "平溪線"),
    ("LINE_NW", "內灣線"),
    ("LINE_LJ", "六家線"),
    ("LINE_J", "集集線"),
    ("LINE_SL", "沙崙線"),
    ("LINE_I", "宜蘭線"),
    ("LINE_N", "北迴線"),
];

/// Look up the display name of a line code
#[must_use]
pub fn line_name(code: &str) -> Option<&'static str> {
    LINE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Reference file names inside a reference data directory
pub mod files {
    pub const ROUTE: &str = "Route.json";
    pub const TIME_AXIS: &str = "SVG_X_Axis.json";
    pub const LINE_AXIS: &str = "SVG_Y_Axis.json";
    pub const CAR_KIND: &str = "CarKind.json";
}
