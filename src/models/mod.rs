pub(crate) mod lenient;
mod operation_line;
mod route_graph;
mod routing;
mod timetable;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use operation_line::{LineCatalog, LineStation, OperationalLine};
pub use route_graph::{Link, LinkKind, RouteGraph, Station, StationLinks};
pub use routing::{BranchFlags, FlagDefinition, FlagTrigger, Hop, RoutingRule, RoutingTable, WalkContext};
pub use timetable::{DailyTimetable, RejectedRecord, TimetableEntry, TrainRun};

/// Travel direction of a train run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Code `1` (順行)
    Clockwise,
    /// Code `2` (逆行)
    Counterclockwise,
}

impl Direction {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Clockwise),
            "2" => Some(Self::Counterclockwise),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Clockwise => "1",
            Self::Counterclockwise => "2",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clockwise => write!(f, "clockwise"),
            Self::Counterclockwise => write!(f, "counterclockwise"),
        }
    }
}

impl Serialize for Direction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = lenient::code::deserialize(deserializer)?;
        Self::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown direction code {code:?}")))
    }
}
