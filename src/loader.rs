//! Reading reference data and daily timetables from disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::constants::files;
use crate::error::DataError;
use crate::models::{DailyTimetable, LineCatalog, RouteGraph, RoutingTable};
use crate::pipeline::ReferenceData;
use crate::time::TimeAxis;

/// Date format of daily timetable file names
const DAILY_FILE_DATE: &str = "%Y%m%d";

fn read(path: &Path) -> Result<String, DataError> {
    fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every reference file from a directory
///
/// The time axis file is optional; the synthetic half-minute axis is used when
/// it is absent. Routing uses the built-in network table.
///
/// # Errors
///
/// Returns an error if a required file is missing or any file fails to parse.
pub fn load_reference(dir: &Path) -> Result<ReferenceData, DataError> {
    let graph = RouteGraph::from_json_str(&read(&dir.join(files::ROUTE))?)?;
    let lines = LineCatalog::from_json_str(&read(&dir.join(files::LINE_AXIS))?)?;
    let styles: HashMap<String, String> = serde_json::from_str(&read(&dir.join(files::CAR_KIND))?)?;

    let axis_path = dir.join(files::TIME_AXIS);
    let axis = if axis_path.exists() {
        TimeAxis::from_json_str(&read(&axis_path)?)?
    } else {
        log::info!("{} not found, using the half-minute time axis", axis_path.display());
        TimeAxis::half_minute()
    };

    crate::debug_log!(
        "Loaded {} stations, {} lines, {} car classes, {} time keys from {}",
        graph.len(),
        lines.len(),
        styles.len(),
        axis.len(),
        dir.display()
    );

    Ok(ReferenceData {
        graph,
        routing: RoutingTable::taiwan_railway(),
        axis,
        lines,
        styles,
    })
}

/// Load a routing table from a JSON file instead of the built-in one
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_routing(path: &Path) -> Result<RoutingTable, DataError> {
    Ok(RoutingTable::from_json_str(&read(path)?)?)
}

/// # Errors
///
/// Returns an error if the file cannot be read or is not a train list.
pub fn load_timetable(path: &Path) -> Result<DailyTimetable, DataError> {
    DailyTimetable::from_json_str(&read(path)?)
}

/// Path of the daily timetable for `date` inside a data directory
#[must_use]
pub fn daily_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(format!("{}.json", date.format(DAILY_FILE_DATE)))
}

/// Dates with a daily timetable in a data directory, oldest first
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn available_dates(data_dir: &Path) -> Result<Vec<NaiveDate>, DataError> {
    let entries = fs::read_dir(data_dir).map_err(|source| DataError::Io {
        path: data_dir.to_path_buf(),
        source,
    })?;

    let mut dates: Vec<NaiveDate> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let stem = name.to_str()?.strip_suffix(".json")?;
            NaiveDate::parse_from_str(stem.get(..8)?, DAILY_FILE_DATE).ok()
        })
        .collect();
    dates.sort_unstable();
    dates.dedup();
    Ok(dates)
}
