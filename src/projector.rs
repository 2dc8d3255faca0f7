//! Projection of a train's samples onto operational lines.

use serde::Serialize;

use crate::config::DiagramConfig;
use crate::constants::MIN_LINE_SAMPLES;
use crate::estimator::TimeSpaceSample;
use crate::models::{LineCatalog, OperationalLine};

/// A time-space sample placed on one line's vertical axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSample {
    /// Travel-order position in the train's full sample list
    pub seq: usize,
    pub station_id: String,
    pub name: String,
    pub time: Option<f64>,
    /// Line-specific vertical display coordinate
    pub y: f64,
    pub order: Option<u32>,
}

/// Which lines a projection considers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineSelection {
    #[default]
    All,
    Only(String),
}

impl LineSelection {
    #[must_use]
    pub fn includes(&self, code: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == code,
        }
    }
}

/// One train's samples on one line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineProjection {
    pub line_code: String,
    pub samples: Vec<LineSample>,
}

/// Samples of one train that fall on a single line, in travel order
#[must_use]
pub fn project_onto_line(samples: &[TimeSpaceSample], line: &OperationalLine) -> Vec<LineSample> {
    samples
        .iter()
        .filter_map(|s| {
            line.y_of(&s.station_id).map(|y| LineSample {
                seq: s.seq,
                station_id: s.station_id.clone(),
                name: s.name.clone(),
                time: s.time,
                y,
                order: s.order,
            })
        })
        .collect()
}

/// Project a train onto every selected line serving its sub-area
///
/// Which sub-areas a line serves comes from `config.line_sub_areas`. Lines
/// where the train leaves fewer than three samples are left out.
#[must_use]
pub fn project_onto_lines(
    samples: &[TimeSpaceSample],
    sub_area: &str,
    catalog: &LineCatalog,
    selection: &LineSelection,
    config: &DiagramConfig,
) -> Vec<LineProjection> {
    catalog
        .iter()
        .filter(|line| selection.includes(&line.code) && config.serves(&line.code, sub_area))
        .filter_map(|line| {
            let projected = project_onto_line(samples, line);
            (projected.len() >= MIN_LINE_SAMPLES).then(|| LineProjection {
                line_code: line.code.clone(),
                samples: projected,
            })
        })
        .collect()
}
