use std::collections::HashMap;
use std::path::Path;

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::DIAGRAM_HOURS;
use crate::error::DataError;
use crate::geometry::{round2, Point};
use crate::time::TimeAxis;

/// Drawing-space axis convention for turning chart values into coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramScale {
    /// Drawing units per chart-X unit
    pub x_per_unit: f64,
    /// Drawing width of one hour
    pub hour_width: f64,
    /// Hour shown at the left edge
    pub first_hour: u32,
    pub margin: f64,
    /// Hour columns across the diagram
    pub hours: usize,
}

impl Default for DiagramScale {
    fn default() -> Self {
        Self {
            x_per_unit: 10.0,
            hour_width: 1200.0,
            first_hour: DIAGRAM_HOURS[0],
            margin: 50.0,
            hours: DIAGRAM_HOURS.len(),
        }
    }
}

impl DiagramScale {
    #[must_use]
    pub fn x(&self, time: f64) -> f64 {
        time * self.x_per_unit - self.hour_width * f64::from(self.first_hour) + self.margin
    }

    #[must_use]
    pub fn y(&self, y: f64) -> f64 {
        y + self.margin
    }

    /// Drawing coordinate of a sample, rounded to two decimals
    #[must_use]
    pub fn point(&self, time: f64, y: f64) -> Point {
        (round2(self.x(time)), round2(self.y(y)))
    }

    /// X coordinate of the "now" marker, drawn `lag` behind the wall clock
    #[must_use]
    pub fn now_x(&self, axis: &TimeAxis, now: NaiveTime, lag: Duration) -> Option<f64> {
        axis.value_at(now, lag).map(|value| round2(self.x(value)))
    }
}

/// Label-anchor thresholds in drawing units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPlacement {
    /// Pieces up to this length get no anchor
    pub min_span: f64,
    /// Pieces longer than this get two anchors instead of one
    pub long_span: f64,
    pub local_min_span: f64,
    /// Fraction along a piece where a local-service anchor sits
    pub local_offset_ratio: f64,
    /// Style key that selects the local-service rule
    pub local_style: String,
}

impl Default for LabelPlacement {
    fn default() -> Self {
        Self {
            min_span: 50.0,
            long_span: 500.0,
            local_min_span: 60.0,
            local_offset_ratio: 0.25,
            local_style: "local".to_string(),
        }
    }
}

/// Diagram configuration, every field defaulted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub scale: DiagramScale,
    pub labels: LabelPlacement,
    /// Line code → sub-area codes whose trains it shows
    pub line_sub_areas: HashMap<String, Vec<String>>,
}

impl DiagramConfig {
    /// Whether trains of `sub_area` are drawn on the line `line_code`
    ///
    /// Lines without a `line_sub_areas` entry serve every sub-area.
    #[must_use]
    pub fn serves(&self, line_code: &str, sub_area: &str) -> bool {
        self.line_sub_areas
            .get(line_code)
            .map_or(true, |codes| codes.iter().any(|c| c == sub_area))
    }

    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml_str(toml: &str) -> Result<Self, DataError> {
        Ok(toml::from_str(toml)?)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
