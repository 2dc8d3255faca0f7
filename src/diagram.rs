//! Diagram geometry: one train's samples on one line turned into drawable
//! polylines with label anchors.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::{DiagramScale, LabelPlacement};
use crate::constants::MIN_SEGMENT_POINTS;
use crate::geometry::{point_at_distance, segment_lengths, Point};
use crate::projector::LineSample;

/// A drawable polyline plus label positions along it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramSegment {
    pub points: Vec<Point>,
    /// Cumulative distances along `points` where a train label goes
    pub label_anchors: Vec<f64>,
}

impl DiagramSegment {
    /// On-path points for the label anchors
    #[must_use]
    pub fn label_points(&self) -> Vec<Point> {
        self.label_anchors
            .iter()
            .filter_map(|&along| point_at_distance(&self.points, along))
            .collect()
    }
}

/// Label placement rule, picked by the train's style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRule {
    /// Dense stopping services: fewer, offset anchors
    Local,
    Standard,
}

impl LabelRule {
    #[must_use]
    pub fn for_style(style: &str, placement: &LabelPlacement) -> Self {
        if style == placement.local_style {
            Self::Local
        } else {
            Self::Standard
        }
    }
}

/// Position of the first key that does not continue the run started by the
/// first key
///
/// ```
/// use rail_diagram::diagram::find_order_break;
///
/// assert_eq!(find_order_break(&[5, 6, 7, 2, 3, 4]), Some(3));
/// assert_eq!(find_order_break(&[1, 2, 3]), None);
/// ```
#[must_use]
pub fn find_order_break(keys: &[usize]) -> Option<usize> {
    let mut expected = *keys.first()?;
    for (i, &key) in keys.iter().enumerate() {
        if key != expected {
            return Some(i);
        }
        expected = key + 1;
    }
    None
}

/// Split samples at the first run-order break, into at most two runs
#[must_use]
pub fn split_runs(samples: &[LineSample]) -> Vec<&[LineSample]> {
    let keys: Vec<usize> = samples.iter().map(|s| s.seq).collect();
    match find_order_break(&keys) {
        Some(at) => {
            let (head, tail) = samples.split_at(at);
            vec![head, tail]
        }
        None => vec![samples],
    }
}

/// Drawing coordinates of the samples worth drawing: stops, plus terminals
/// passed through
///
/// Samples without a time are skipped.
#[must_use]
pub fn drawable_points(run: &[LineSample], terminals: &HashSet<&str>, scale: &DiagramScale) -> Vec<Point> {
    run.iter()
        .filter(|s| s.order.is_some() || terminals.contains(s.station_id.as_str()))
        .filter_map(|s| s.time.map(|t| scale.point(t, s.y)))
        .collect()
}

/// Label anchors along a polyline, as cumulative distances
///
/// Standard: one anchor at the middle of each piece longer than `min_span`,
/// two at the thirds of pieces longer than `long_span`. Local: one anchor a
/// fixed fraction into each piece longer than `local_min_span`, keeping every
/// other candidate.
#[must_use]
pub fn label_anchors(points: &[Point], rule: LabelRule, placement: &LabelPlacement) -> Vec<f64> {
    let mut anchors = Vec::new();
    let mut travelled = 0.0;

    for length in segment_lengths(points) {
        match rule {
            LabelRule::Standard => {
                if length > placement.long_span {
                    anchors.push(travelled + length / 3.0);
                    anchors.push(travelled + length * 2.0 / 3.0);
                } else if length > placement.min_span {
                    anchors.push(travelled + length / 2.0);
                }
            }
            LabelRule::Local => {
                if length > placement.local_min_span {
                    anchors.push(travelled + length * placement.local_offset_ratio);
                }
            }
        }
        travelled += length;
    }

    if rule == LabelRule::Local {
        anchors = anchors.into_iter().step_by(2).collect();
    }
    anchors
}

/// Build the drawable segments for one train on one line
#[must_use]
pub fn build_segments(
    samples: &[LineSample],
    terminals: &HashSet<&str>,
    rule: LabelRule,
    scale: &DiagramScale,
    placement: &LabelPlacement,
) -> Vec<DiagramSegment> {
    split_runs(samples)
        .into_iter()
        .map(|run| drawable_points(run, terminals, scale))
        .filter(|points| points.len() >= MIN_SEGMENT_POINTS)
        .map(|points| DiagramSegment {
            label_anchors: label_anchors(&points, rule, placement),
            points,
        })
        .collect()
}
