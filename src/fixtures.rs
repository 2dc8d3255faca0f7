//! Small networks and timetables shared by the unit tests.

use crate::models::{
    Direction, Hop, Link, LinkKind, RouteGraph, RoutingRule, RoutingTable, Station, TimetableEntry, TrainRun,
};

pub fn station(id: &str, km_post: f64) -> Station {
    Station::new(id, format!("Station {id}"), km_post)
}

/// `A -10- B -20- C`, walkable in both directions
pub fn linear_graph() -> RouteGraph {
    RouteGraph::from_stations([
        station("A", 0.0).with_link(Direction::Clockwise, LinkKind::Main, Link::new("B", 10.0)),
        station("B", 10.0)
            .with_link(Direction::Clockwise, LinkKind::Main, Link::new("C", 20.0))
            .with_link(Direction::Counterclockwise, LinkKind::Main, Link::new("A", 10.0)),
        station("C", 30.0).with_link(Direction::Counterclockwise, LinkKind::Main, Link::new("B", 20.0)),
    ])
}

/// Ring `A -5- B -5- C -5- D -5- A` with a spur `B -3- S1 -2- S2` and a loop
/// connection `A -12- C` used while the `short_cut` flag is raised
pub fn ring_graph() -> RouteGraph {
    RouteGraph::from_stations([
        station("A", 0.0)
            .with_link(Direction::Clockwise, LinkKind::Main, Link::new("B", 5.0))
            .with_link(Direction::Clockwise, LinkKind::Loop, Link::new("C", 12.0)),
        station("B", 5.0)
            .with_link(Direction::Clockwise, LinkKind::Main, Link::new("C", 5.0))
            .with_link(Direction::Clockwise, LinkKind::Branch, Link::new("S1", 3.0)),
        station("C", 10.0)
            .with_link(Direction::Clockwise, LinkKind::Main, Link::new("D", 5.0))
            .with_link(Direction::Clockwise, LinkKind::Loop, Link::new("D", 5.0)),
        station("D", 15.0)
            .with_link(Direction::Clockwise, LinkKind::Main, Link::new("A", 5.0))
            .with_link(Direction::Clockwise, LinkKind::Loop, Link::new("A", 5.0)),
        station("S1", 8.0).with_link(Direction::Clockwise, LinkKind::Main, Link::new("S2", 2.0)),
        station("S2", 10.0),
    ])
}

pub fn ring_table() -> RoutingTable {
    RoutingTable {
        loop_flag: Some("short_cut".to_string()),
        ..RoutingTable::default()
    }
    .with_flag(
        "spur",
        vec![crate::models::FlagTrigger::AnyStation {
            stations: vec!["S2".to_string()],
        }],
    )
    .with_flag(
        "short_cut",
        vec![crate::models::FlagTrigger::SubArea { code: "3".to_string() }],
    )
    .with_rule(
        Direction::Clockwise,
        "B",
        RoutingRule::if_flag("spur", RoutingRule::follow(Hop::branch()), RoutingRule::follow(Hop::main())),
    )
}

/// Timetable entry on the half-minute axis
pub fn entry(station: &str, arrival: &str, departure: &str, order: u32) -> TimetableEntry {
    TimetableEntry {
        station: station.to_string(),
        arrival: arrival.to_string(),
        departure: departure.to_string(),
        order,
    }
}

pub fn train(id: &str, sub_area: &str, direction: Direction, entries: Vec<TimetableEntry>) -> TrainRun {
    TrainRun {
        id: id.to_string(),
        car_class: "1100".to_string(),
        sub_area: sub_area.to_string(),
        direction,
        entries,
    }
}
