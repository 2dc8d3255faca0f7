//! Batch driver: every train of a daily timetable through resolution,
//! estimation, projection and geometry.
//!
//! Trains are independent, so the batch fans out over rayon. A fault in one
//! train is logged and reported in [`DiagramBatch::skipped`]; it never stops
//! the rest of the batch.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::DiagramConfig;
use crate::constants::DEFAULT_STYLE;
use crate::diagram::{build_segments, DiagramSegment, LabelRule};
use crate::error::TrainError;
use crate::estimator::estimate_time_space;
use crate::models::{DailyTimetable, Direction, LineCatalog, RejectedRecord, RouteGraph, RoutingTable, TrainRun};
use crate::projector::{project_onto_lines, LineSelection};
use crate::resolver::resolve_passing_stations;
use crate::time::TimeAxis;

/// Immutable inputs shared by every train of a batch
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub graph: RouteGraph,
    pub routing: RoutingTable,
    pub axis: TimeAxis,
    pub lines: LineCatalog,
    /// Car class → style key
    pub styles: HashMap<String, String>,
}

impl ReferenceData {
    /// Style key for a car class, `others` when unmapped
    #[must_use]
    pub fn style_of(&self, car_class: &str) -> &str {
        self.styles.get(car_class).map_or(DEFAULT_STYLE, String::as_str)
    }
}

/// One train drawn on one line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainDiagram {
    pub line_code: String,
    pub train_id: String,
    pub car_class: String,
    pub style: String,
    pub sub_area: String,
    pub direction: Direction,
    pub segments: Vec<DiagramSegment>,
}

/// A train that produced no diagrams, with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTrain {
    /// `None` when the record was too malformed to carry an id
    pub train_id: Option<String>,
    pub reason: String,
}

impl From<RejectedRecord> for SkippedTrain {
    fn from(record: RejectedRecord) -> Self {
        Self {
            train_id: record.train_id,
            reason: format!("record {}: {}", record.index, record.reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramBatch {
    pub diagrams: Vec<TrainDiagram>,
    pub skipped: Vec<SkippedTrain>,
}

impl DiagramBatch {
    /// Diagrams drawn on one line, in timetable order
    pub fn for_line<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a TrainDiagram> + 'a {
        self.diagrams.iter().filter(move |d| d.line_code == code)
    }
}

/// Restrictions applied to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub lines: LineSelection,
    /// Only draw the train with this id
    pub train: Option<String>,
}

impl BatchOptions {
    fn wants(&self, train_id: Option<&str>) -> bool {
        match (&self.train, train_id) {
            (None, _) => true,
            (Some(wanted), Some(id)) => wanted == id,
            (Some(_), None) => false,
        }
    }
}

/// Run one train through the whole pipeline
///
/// Returns one diagram per line the train has enough samples on. Lines where
/// every segment turns out degenerate are left out.
///
/// # Errors
///
/// Returns an error if the train's path cannot be resolved or a time key is
/// off the axis.
pub fn diagram_train(
    reference: &ReferenceData,
    config: &DiagramConfig,
    run: &TrainRun,
    selection: &LineSelection,
) -> Result<Vec<TrainDiagram>, TrainError> {
    let passing = resolve_passing_stations(&reference.graph, &reference.routing, run)?;
    let samples = estimate_time_space(
        &passing,
        run,
        &reference.axis,
        reference.routing.loop_close_station.as_deref(),
    )?;

    let style = reference.style_of(&run.car_class);
    let rule = LabelRule::for_style(style, &config.labels);

    let diagrams = project_onto_lines(&samples, &run.sub_area, &reference.lines, selection, config)
        .into_iter()
        .filter_map(|projection| {
            let terminals = reference
                .lines
                .get(&projection.line_code)
                .map(|line| line.terminals())
                .unwrap_or_default();
            let segments = build_segments(&projection.samples, &terminals, rule, &config.scale, &config.labels);
            (!segments.is_empty()).then(|| TrainDiagram {
                line_code: projection.line_code,
                train_id: run.id.clone(),
                car_class: run.car_class.clone(),
                style: style.to_string(),
                sub_area: run.sub_area.clone(),
                direction: run.direction,
                segments,
            })
        })
        .collect();
    Ok(diagrams)
}

/// Build diagrams for every train of a daily timetable
///
/// Records rejected while parsing the timetable are carried into
/// [`DiagramBatch::skipped`] alongside trains that failed here.
#[must_use]
pub fn build_diagrams(
    reference: &ReferenceData,
    config: &DiagramConfig,
    timetable: &DailyTimetable,
    options: &BatchOptions,
) -> DiagramBatch {
    #[cfg(feature = "perf_timing")]
    let start = std::time::Instant::now();

    let results: Vec<(&TrainRun, Result<Vec<TrainDiagram>, TrainError>)> = timetable
        .trains
        .par_iter()
        .filter(|run| options.wants(Some(run.id.as_str())))
        .map(|run| (run, diagram_train(reference, config, run, &options.lines)))
        .collect();

    let mut batch = DiagramBatch {
        skipped: timetable
            .rejected
            .iter()
            .filter(|record| options.wants(record.train_id.as_deref()))
            .cloned()
            .map(SkippedTrain::from)
            .collect(),
        ..DiagramBatch::default()
    };

    for (run, result) in results {
        match result {
            Ok(diagrams) => batch.diagrams.extend(diagrams),
            Err(e) => {
                log::warn!("Skipping train {}: {e}", run.id);
                batch.skipped.push(SkippedTrain {
                    train_id: Some(run.id.clone()),
                    reason: e.to_string(),
                });
            }
        }
    }

    #[cfg(feature = "perf_timing")]
    log::info!(
        "Built {} diagrams from {} trains in {:.2?} ({} skipped)",
        batch.diagrams.len(),
        timetable.trains.len(),
        start.elapsed(),
        batch.skipped.len()
    );

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{entry, linear_graph, train};
    use crate::models::{LineStation, OperationalLine};
    use approx::assert_relative_eq;

    fn line_station(id: &str, y: f64, terminal: bool) -> LineStation {
        LineStation {
            id: Some(id.to_string()),
            name: format!("Station {id}"),
            y,
            terminal,
        }
    }

    fn reference() -> ReferenceData {
        let lines = [
            OperationalLine::new(
                "MAIN",
                vec![
                    line_station("A", 0.0, true),
                    line_station("B", 100.0, true),
                    line_station("C", 200.0, true),
                ],
            ),
            OperationalLine::new("SPUR", vec![line_station("B", 0.0, false), line_station("C", 50.0, false)]),
        ]
        .into_iter()
        .collect();

        ReferenceData {
            graph: linear_graph(),
            routing: RoutingTable::default(),
            axis: TimeAxis::half_minute(),
            lines,
            styles: HashMap::from([("1100".to_string(), "express".to_string())]),
        }
    }

    fn a_to_c(id: &str) -> TrainRun {
        train(
            id,
            "0",
            Direction::Clockwise,
            vec![entry("A", "08:00:00", "08:01:00", 1), entry("C", "08:11:00", "08:12:00", 2)],
        )
    }

    #[test]
    fn test_end_to_end_single_train() {
        let diagrams = diagram_train(&reference(), &DiagramConfig::default(), &a_to_c("101"), &LineSelection::All)
            .expect("train resolves");

        let lines: Vec<_> = diagrams.iter().map(|d| d.line_code.as_str()).collect();
        assert_eq!(lines, vec!["MAIN", "SPUR"]);
        let diagram = &diagrams[0];
        assert_eq!(diagram.train_id, "101");
        assert_eq!(diagram.style, "express");
        assert_eq!(diagram.segments.len(), 1);

        // B is passed at the interpolated time 972, midway in travel order
        let segment = &diagram.segments[0];
        assert_eq!(
            segment.points,
            vec![
                (4850.0, 50.0),
                (4870.0, 50.0),
                (4970.0, 150.0),
                (5070.0, 250.0),
                (5090.0, 250.0)
            ]
        );

        let diagonal = 100.0 * std::f64::consts::SQRT_2;
        assert_eq!(segment.label_anchors.len(), 2);
        assert_relative_eq!(segment.label_anchors[0], 20.0 + diagonal / 2.0, epsilon = 1e-9);
        assert_relative_eq!(segment.label_anchors[1], 20.0 + diagonal * 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_faults_are_contained_per_train() {
        let mut timetable = DailyTimetable {
            trains: vec![
                a_to_c("101"),
                train(
                    "102",
                    "0",
                    Direction::Clockwise,
                    vec![entry("X", "08:00:00", "08:00:00", 1), entry("C", "09:00:00", "09:00:00", 2)],
                ),
                a_to_c("103"),
            ],
            rejected: Vec::new(),
        };
        timetable.rejected.push(RejectedRecord {
            index: 3,
            train_id: Some("104".to_string()),
            reason: "missing field `LineDir`".to_string(),
        });

        let batch = build_diagrams(&reference(), &DiagramConfig::default(), &timetable, &BatchOptions::default());

        let drawn: Vec<_> = batch.for_line("MAIN").map(|d| d.train_id.as_str()).collect();
        assert_eq!(drawn, vec!["101", "103"]);

        let skipped: Vec<_> = batch.skipped.iter().filter_map(|s| s.train_id.as_deref()).collect();
        assert_eq!(skipped, vec!["104", "102"]);
        assert!(batch.skipped[1].reason.contains("Station X not found"));
        assert_eq!(batch.diagrams.len(), 4);
    }

    #[test]
    fn test_train_and_line_filters() {
        let timetable = DailyTimetable {
            trains: vec![a_to_c("101"), a_to_c("103")],
            rejected: Vec::new(),
        };

        let options = BatchOptions {
            train: Some("103".to_string()),
            ..BatchOptions::default()
        };
        let batch = build_diagrams(&reference(), &DiagramConfig::default(), &timetable, &options);
        assert_eq!(batch.diagrams.len(), 2);
        assert!(batch.diagrams.iter().all(|d| d.train_id == "103"));

        let options = BatchOptions {
            lines: LineSelection::Only("SPUR".to_string()),
            ..BatchOptions::default()
        };
        let batch = build_diagrams(&reference(), &DiagramConfig::default(), &timetable, &options);
        // B is passed and not a terminal on the spur, so only the stop at C is drawn
        assert_eq!(batch.diagrams.len(), 2);
        assert!(batch.diagrams.iter().all(|d| d.line_code == "SPUR"));
        assert_eq!(batch.diagrams[0].segments[0].points, vec![(5070.0, 100.0), (5090.0, 100.0)]);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn test_line_sub_areas_limit_which_lines_draw_a_train() {
        let config = DiagramConfig {
            line_sub_areas: HashMap::from([("SPUR".to_string(), vec!["2".to_string()])]),
            ..DiagramConfig::default()
        };
        let coast = train(
            "201",
            "2",
            Direction::Clockwise,
            vec![entry("A", "08:00:00", "08:01:00", 1), entry("C", "08:11:00", "08:12:00", 2)],
        );
        let timetable = DailyTimetable {
            trains: vec![a_to_c("101"), coast],
            rejected: Vec::new(),
        };

        let batch = build_diagrams(&reference(), &config, &timetable, &BatchOptions::default());

        let spur: Vec<_> = batch.for_line("SPUR").map(|d| d.train_id.as_str()).collect();
        assert_eq!(spur, vec!["201"]);
        let main: Vec<_> = batch.for_line("MAIN").map(|d| d.train_id.as_str()).collect();
        assert_eq!(main, vec!["101", "201"]);
    }

    #[test]
    fn test_local_style_changes_label_rule() {
        let mut reference = reference();
        reference.styles.insert("1100".to_string(), "local".to_string());

        let diagrams = diagram_train(&reference, &DiagramConfig::default(), &a_to_c("101"), &LineSelection::All)
            .expect("train resolves");

        // Candidates at a quarter of each diagonal; every other one kept
        let segment = &diagrams[0].segments[0];
        assert_eq!(segment.label_anchors.len(), 1);
        assert_relative_eq!(
            segment.label_anchors[0],
            20.0 + 25.0 * std::f64::consts::SQRT_2,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_unmapped_car_class_uses_default_style() {
        assert_eq!(reference().style_of("9999"), "others");
        assert_eq!(reference().style_of("1100"), "express");
    }
}
