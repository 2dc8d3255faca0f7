use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rail_diagram::models::{
    DailyTimetable, Direction, LineCatalog, LineStation, Link, LinkKind, OperationalLine, RouteGraph, RoutingTable,
    Station, TimetableEntry, TrainRun,
};
use rail_diagram::pipeline::{build_diagrams, diagram_train, BatchOptions, ReferenceData};
use rail_diagram::projector::LineSelection;
use rail_diagram::time::TimeAxis;
use rail_diagram::DiagramConfig;
use std::collections::HashMap;

const STATIONS: usize = 120;
const TRAINS: usize = 400;

fn station_id(i: usize) -> String {
    format!("{:04}", 1000 + i * 10)
}

/// Straight double-track line with a station every 3 km
fn network() -> ReferenceData {
    let stations = (0..STATIONS).map(|i| {
        #[allow(clippy::cast_precision_loss)]
        let mut station = Station::new(station_id(i), format!("Station {i}"), i as f64 * 3.0);
        if i + 1 < STATIONS {
            station = station.with_link(Direction::Clockwise, LinkKind::Main, Link::new(station_id(i + 1), 3.0));
        }
        if i > 0 {
            station = station.with_link(Direction::Counterclockwise, LinkKind::Main, Link::new(station_id(i - 1), 3.0));
        }
        station
    });

    #[allow(clippy::cast_precision_loss)]
    let line = OperationalLine::new(
        "LINE_WN",
        (0..STATIONS)
            .map(|i| LineStation {
                id: Some(station_id(i)),
                name: format!("Station {i}"),
                y: i as f64 * 20.0,
                terminal: i % 10 == 0,
            })
            .collect(),
    );

    ReferenceData {
        graph: RouteGraph::from_stations(stations),
        routing: RoutingTable::default(),
        axis: TimeAxis::half_minute(),
        lines: LineCatalog::from_iter([line]),
        styles: HashMap::from([("1131".to_string(), "local".to_string())]),
    }
}

fn hms(minutes: usize) -> String {
    format!("{:02}:{:02}:00", (minutes / 60) % 24, minutes % 60)
}

/// Trains alternating direction, stopping at every third station
fn timetable() -> DailyTimetable {
    let trains = (0..TRAINS)
        .map(|t| {
            let direction = if t % 2 == 0 { Direction::Clockwise } else { Direction::Counterclockwise };
            let start = 240 + t * 3;
            let mut stops: Vec<usize> = (0..STATIONS).step_by(3).collect();
            if direction == Direction::Counterclockwise {
                stops.reverse();
            }
            let entries = stops
                .iter()
                .enumerate()
                .map(|(order, &station)| TimetableEntry {
                    station: station_id(station),
                    arrival: hms(start + order * 5),
                    departure: hms(start + order * 5 + 1),
                    order: u32::try_from(order + 1).unwrap_or(u32::MAX),
                })
                .collect();
            TrainRun {
                id: format!("{}", 100 + t),
                car_class: if t % 3 == 0 { "1131" } else { "1100" }.to_string(),
                sub_area: "0".to_string(),
                direction,
                entries,
            }
        })
        .collect();

    DailyTimetable {
        trains,
        rejected: Vec::new(),
    }
}

fn benchmark_pipeline(c: &mut Criterion) {
    let reference = network();
    let config = DiagramConfig::default();
    let timetable = timetable();
    let options = BatchOptions::default();

    // Benchmark one train end to end
    c.bench_function("diagram_train", |b| {
        b.iter(|| {
            diagram_train(
                black_box(&reference),
                black_box(&config),
                black_box(&timetable.trains[0]),
                &LineSelection::All,
            )
        });
    });

    // Benchmark the full daily batch
    c.bench_function("build_diagrams", |b| {
        b.iter(|| build_diagrams(black_box(&reference), black_box(&config), black_box(&timetable), &options));
    });
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
