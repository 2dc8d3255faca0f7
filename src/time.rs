use std::collections::HashMap;

use chrono::{Duration, NaiveTime, Timelike};
use serde::Deserialize;

use crate::constants::DAY_LENGTH;
use crate::error::DataError;
use crate::models::lenient;

/// Seconds per chart-X unit on the half-minute axis
const SECONDS_PER_UNIT: u32 = 30;

/// Lookup from `HH:MM:SS` time keys to chart-X values
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    values: HashMap<String, f64>,
    day_length: f64,
}

#[derive(Deserialize)]
struct AxisRecord {
    #[serde(deserialize_with = "lenient::float::deserialize")]
    ax1: f64,
}

impl TimeAxis {
    #[must_use]
    pub fn new(values: HashMap<String, f64>, day_length: f64) -> Self {
        Self { values, day_length }
    }

    /// Synthetic axis: one key every 30 seconds, valued in half-minutes since
    /// midnight
    #[must_use]
    pub fn half_minute() -> Self {
        let mut values = HashMap::with_capacity(2880);
        let mut time = NaiveTime::MIN;
        for unit in 0..2880u32 {
            values.insert(time.format("%H:%M:%S").to_string(), f64::from(unit));
            time += Duration::seconds(i64::from(SECONDS_PER_UNIT));
        }
        Self::new(values, DAY_LENGTH)
    }

    /// Parse the time axis reference file: time key → `{ "ax1": value }`
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a key is not `HH:MM:SS`.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let records: HashMap<String, AxisRecord> = serde_json::from_str(json)?;
        let mut values = HashMap::with_capacity(records.len());
        for (key, record) in records {
            if parse_time_hms(&key).is_err() {
                return Err(DataError::InvalidTimeKey(key));
            }
            values.insert(key, record.ax1);
        }
        Ok(Self::new(values, DAY_LENGTH))
    }

    /// Chart-X value of a time key
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Axis units added to times past a midnight rollover
    #[must_use]
    pub fn day_length(&self) -> f64 {
        self.day_length
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Chart-X value for a wall-clock time, `lag` earlier, rounded to the
    /// nearest half minute
    #[must_use]
    pub fn value_at(&self, now: NaiveTime, lag: Duration) -> Option<f64> {
        self.value_of(&half_minute_key(now - lag))
    }
}

/// Round a time to the nearest half minute and format it as an axis key
#[must_use]
pub fn half_minute_key(time: NaiveTime) -> String {
    let seconds = time.num_seconds_from_midnight();
    let rounded = (seconds + SECONDS_PER_UNIT / 2) / SECONDS_PER_UNIT * SECONDS_PER_UNIT;
    let rounded = NaiveTime::MIN + Duration::seconds(i64::from(rounded));
    rounded.format("%H:%M:%S").to_string()
}

/// Parse a time string in HH:MM:SS format
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a valid time in HH:MM:SS format.
pub fn parse_time_hms(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
}
