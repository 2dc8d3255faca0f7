//! Error taxonomy for loading and per-train processing.

use std::path::PathBuf;

use crate::models::Direction;

/// Failure to walk the route graph for one train
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Timetable has fewer than two entries")]
    EmptyTimetable,
    #[error("Station {0} not found in route data")]
    UnknownStation(String),
    #[error("No routing rule yields a successor for station {station} ({direction})")]
    NoSuccessor { station: String, direction: Direction },
    #[error("Station {station} has no {link} link ({direction})")]
    MissingLink {
        station: String,
        link: &'static str,
        direction: Direction,
    },
    #[error("Walk revisited station {0} before reaching its end station")]
    Revisited(String),
    #[error("Walk did not reach end station {end} within {steps} steps")]
    NonConvergent { end: String, steps: usize },
}

/// Failure to turn a passing-station list into time-space samples
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Time key {key:?} at station {station} is not on the time axis")]
    UnknownTimeKey { station: String, key: String },
}

/// Anything that makes a single train drop out of a batch
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    #[error("Malformed train record: {0}")]
    Malformed(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

/// Failure to load reference data, timetables or configuration
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid {field} for station {station}: {value:?}")]
    InvalidField {
        station: String,
        field: &'static str,
        value: String,
    },
    #[error("Invalid time key {0:?}")]
    InvalidTimeKey(String),
}
