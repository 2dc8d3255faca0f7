use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient, Direction};
use crate::error::{DataError, TrainError};

/// One timetable row: a train's scheduled stop at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    #[serde(rename = "Station", deserialize_with = "lenient::code::deserialize")]
    pub station: String,
    /// Arrival time key (`HH:MM:SS`)
    #[serde(rename = "ARRTime")]
    pub arrival: String,
    /// Departure time key (`HH:MM:SS`)
    #[serde(rename = "DEPTime")]
    pub departure: String,
    /// Position in the train's nominal stop order
    #[serde(rename = "Order", deserialize_with = "lenient::index::deserialize")]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRun {
    #[serde(rename = "Train", deserialize_with = "lenient::code::deserialize")]
    pub id: String,
    /// Car / service class code
    #[serde(rename = "CarClass", deserialize_with = "lenient::code::deserialize")]
    pub car_class: String,
    /// Network sub-area code (mountain, coast, loop, ...)
    #[serde(rename = "Line", deserialize_with = "lenient::code::deserialize")]
    pub sub_area: String,
    #[serde(rename = "LineDir")]
    pub direction: Direction,
    #[serde(rename = "TimeInfos")]
    pub entries: Vec<TimetableEntry>,
}

impl TrainRun {
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.entries.first().map(|e| e.station.as_str())
    }

    #[must_use]
    pub fn terminus(&self) -> Option<&str> {
        self.entries.last().map(|e| e.station.as_str())
    }

    /// Station ids the timetable touches
    #[must_use]
    pub fn touched_stations(&self) -> HashSet<&str> {
        self.entries.iter().map(|e| e.station.as_str()).collect()
    }

    /// Timetable entry for a station; the last entry wins on duplicates
    #[must_use]
    pub fn entry_for(&self, station: &str) -> Option<&TimetableEntry> {
        self.entries.iter().rev().find(|e| e.station == station)
    }

    /// Decode one train record, rejecting records the pipeline cannot walk
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::Malformed`] if a required field is missing or
    /// invalid, or the timetable has fewer than two entries.
    pub fn from_value(value: Value) -> Result<Self, TrainError> {
        let run: Self = serde_json::from_value(value).map_err(|e| TrainError::Malformed(e.to_string()))?;
        if run.entries.len() < 2 {
            return Err(TrainError::Malformed(format!(
                "train {} has {} timetable entries",
                run.id,
                run.entries.len()
            )));
        }
        Ok(run)
    }
}

/// Train record that could not be decoded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Position in the daily file
    pub index: usize,
    pub train_id: Option<String>,
    pub reason: String,
}

/// One day's timetable file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTimetable {
    pub trains: Vec<TrainRun>,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Deserialize)]
struct DailyFile {
    #[serde(rename = "TrainInfos")]
    train_infos: Vec<Value>,
}

impl DailyTimetable {
    /// Parse a daily file, keeping malformed train records aside
    ///
    /// # Errors
    ///
    /// Returns an error only if the file itself is not a train list.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let file: DailyFile = serde_json::from_str(json)?;
        let mut timetable = Self::default();

        for (index, value) in file.train_infos.into_iter().enumerate() {
            let train_id = value
                .get("Train")
                .and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                });
            match TrainRun::from_value(value) {
                Ok(run) => timetable.trains.push(run),
                Err(e) => {
                    log::warn!("Skipping train record {index} ({}): {e}", train_id.as_deref().unwrap_or("?"));
                    timetable.rejected.push(RejectedRecord {
                        index,
                        train_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(timetable)
    }
}
