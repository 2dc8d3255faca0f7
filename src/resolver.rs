//! Station path resolution: which stations a train physically passes.
//!
//! The path is recomputed by walking the route graph from the timetable's
//! first station; the timetable's own station list only feeds the branch
//! flags that settle routing decisions along the way.

use std::collections::HashSet;

use serde::Serialize;

use crate::constants::MAX_WALK_STEPS;
use crate::error::ResolveError;
use crate::models::{Direction, RouteGraph, RoutingTable, Station, TrainRun, WalkContext};

/// A station the train passes, stopping or not
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassingStation {
    pub station_id: String,
    pub name: String,
    pub km_post: f64,
    /// Cumulative distance from the origin in km
    pub distance: f64,
}

impl PassingStation {
    fn at(station: &Station, id: &str, distance: f64) -> Self {
        Self {
            station_id: id.to_string(),
            name: station.name.clone(),
            km_post: station.km_post,
            distance,
        }
    }
}

/// Resolve the ordered stations a train passes between its first and last
/// timetable stations
///
/// A timetable ending at the routing table's loop-close station is a round
/// trip: the walk returns to the origin and the closing record carries the
/// loop-close id so both ends stay distinguishable.
///
/// # Errors
///
/// Returns an error if the timetable is too short, the walk reaches a station
/// missing from the graph, no routing rule or link yields a successor, or the
/// walk fails to converge on its end station.
pub fn resolve_passing_stations(
    graph: &RouteGraph,
    table: &RoutingTable,
    run: &TrainRun,
) -> Result<Vec<PassingStation>, ResolveError> {
    let (Some(origin), Some(terminus)) = (run.origin(), run.terminus()) else {
        return Err(ResolveError::EmptyTimetable);
    };
    if run.entries.len() < 2 {
        return Err(ResolveError::EmptyTimetable);
    }

    let round_trip = table.is_loop_close(terminus);
    let touched = run.touched_stations();
    let ctx = WalkContext {
        flags: table.derive_flags(&run.sub_area, &touched),
        sub_area: &run.sub_area,
        end_station: if round_trip { origin } else { terminus },
    };

    crate::debug_log!(
        "Train {}: walking {} from {} to {} (flags: {:?})",
        run.id,
        run.direction,
        origin,
        ctx.end_station,
        ctx.flags.raised().collect::<Vec<_>>()
    );

    walk(graph, table, run.direction, origin, &ctx, round_trip.then_some(terminus))
}

/// Walk the graph from `origin` until `ctx.end_station` is reached
///
/// `loop_close` replaces the id of the final record when set.
///
/// # Errors
///
/// See [`resolve_passing_stations`].
pub fn walk(
    graph: &RouteGraph,
    table: &RoutingTable,
    direction: Direction,
    origin: &str,
    ctx: &WalkContext<'_>,
    loop_close: Option<&str>,
) -> Result<Vec<PassingStation>, ResolveError> {
    let mut passing = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = origin;
    let mut distance = 0.0;

    loop {
        let station = graph
            .get(current)
            .ok_or_else(|| ResolveError::UnknownStation(current.to_string()))?;
        if !visited.insert(station.id.as_str()) {
            return Err(ResolveError::Revisited(station.id.clone()));
        }
        passing.push(PassingStation::at(station, &station.id, distance));
        if passing.len() >= MAX_WALK_STEPS {
            return Err(ResolveError::NonConvergent {
                end: ctx.end_station.to_string(),
                steps: passing.len(),
            });
        }

        let hop = table
            .rule_for(station, direction, &ctx.flags)
            .decide(ctx)
            .ok_or_else(|| ResolveError::NoSuccessor {
                station: station.id.clone(),
                direction,
            })?;
        let link = station
            .link(direction, hop.link)
            .ok_or_else(|| ResolveError::MissingLink {
                station: station.id.clone(),
                link: hop.link.as_str(),
                direction,
            })?;

        distance += link.distance;
        let next = hop.to.as_deref().unwrap_or(&link.next);

        if next == ctx.end_station {
            let end = graph
                .get(next)
                .ok_or_else(|| ResolveError::UnknownStation(next.to_string()))?;
            passing.push(PassingStation::at(end, loop_close.unwrap_or(next), distance));
            return Ok(passing);
        }
        current = next;
    }
}
