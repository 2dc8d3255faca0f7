use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::constants::{line_name, NON_SERVICED_STATION};
use crate::error::DataError;

/// One horizontal gridline on a line's diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStation {
    /// `None` for a non-serviced placeholder
    pub id: Option<String>,
    pub name: String,
    /// Display coordinate on the line's vertical axis
    pub y: f64,
    /// Terminal / stop-marker stations are always drawn, even when passed
    pub terminal: bool,
}

/// Named subset of the network with its own vertical axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalLine {
    pub code: String,
    pub name: Option<String>,
    stations: Vec<LineStation>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl OperationalLine {
    #[must_use]
    pub fn new(code: impl Into<String>, stations: Vec<LineStation>) -> Self {
        let code = code.into();
        let index = stations
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.id.as_ref().map(|id| (id.clone(), i)))
            .collect();
        Self {
            name: line_name(&code).map(ToString::to_string),
            code,
            stations,
            index,
        }
    }

    #[must_use]
    pub fn station(&self, id: &str) -> Option<&LineStation> {
        self.index.get(id).and_then(|&i| self.stations.get(i))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Vertical display coordinate of a member station
    #[must_use]
    pub fn y_of(&self, id: &str) -> Option<f64> {
        self.station(id).map(|s| s.y)
    }

    /// Stations that must appear on a drawn path even when passed through
    #[must_use]
    pub fn terminals(&self) -> HashSet<&str> {
        self.stations
            .iter()
            .filter(|s| s.terminal)
            .filter_map(|s| s.id.as_deref())
            .collect()
    }

    /// Every gridline, placeholders included, in axis order
    #[must_use]
    pub fn gridlines(&self) -> &[LineStation] {
        &self.stations
    }
}

#[derive(Deserialize)]
struct LineStationRecord {
    #[serde(rename = "ID", deserialize_with = "lenient::code::deserialize")]
    id: String,
    #[serde(rename = "DSC", default)]
    name: String,
    #[serde(rename = "SVGYAXIS", deserialize_with = "lenient::float::deserialize")]
    y: f64,
    #[serde(rename = "TERMINAL", default, deserialize_with = "lenient::optional_code::deserialize")]
    terminal: Option<String>,
}

impl From<LineStationRecord> for LineStation {
    fn from(record: LineStationRecord) -> Self {
        Self {
            id: (record.id != NON_SERVICED_STATION).then_some(record.id),
            name: record.name,
            y: record.y,
            terminal: record.terminal.as_deref() == Some("Y"),
        }
    }
}

/// All operational lines, in reference-file order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineCatalog {
    lines: IndexMap<String, OperationalLine>,
}

impl LineCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: OperationalLine) {
        self.lines.insert(line.code.clone(), line);
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&OperationalLine> {
        self.lines.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationalLine> {
        self.lines.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Parse the line axis reference file: line code → ordered stations
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let records: IndexMap<String, Vec<LineStationRecord>> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (code, stations) in records {
            catalog.insert(OperationalLine::new(code, stations.into_iter().map(LineStation::from).collect()));
        }
        Ok(catalog)
    }
}

impl FromIterator<OperationalLine> for LineCatalog {
    fn from_iter<I: IntoIterator<Item = OperationalLine>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for line in iter {
            catalog.insert(line);
        }
        catalog
    }
}
