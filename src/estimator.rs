//! Time-space estimation: one timed sample per physical event along the path.
//!
//! Stops contribute an arrival and a departure sample, passed stations one
//! untimed sample. Times are then corrected for a midnight rollover and the
//! gaps filled by linear interpolation over travel-order position.

use serde::Serialize;

use crate::error::EstimateError;
use crate::models::TrainRun;
use crate::resolver::PassingStation;
use crate::time::TimeAxis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSpaceSample {
    /// Travel-order position within the train's sample list
    pub seq: usize,
    pub station_id: String,
    pub name: String,
    /// Cumulative distance from the origin in km
    pub distance: f64,
    /// Chart-X time value; `None` where interpolation has no bound on one side
    pub time: Option<f64>,
    /// Stop order index, `None` for a pass-through
    pub order: Option<u32>,
}

impl TimeSpaceSample {
    #[must_use]
    pub fn is_stop(&self) -> bool {
        self.order.is_some()
    }
}

/// Build time-space samples for a resolved path
///
/// `loop_close` is the routing table's loop-close station id; samples carrying
/// it are renamed to the origin's id.
///
/// # Errors
///
/// Returns an error if a timetable time key is not on the axis.
pub fn estimate_time_space(
    passing: &[PassingStation],
    run: &TrainRun,
    axis: &TimeAxis,
    loop_close: Option<&str>,
) -> Result<Vec<TimeSpaceSample>, EstimateError> {
    let origin_id = passing.first().map(|p| p.station_id.as_str());
    let mut samples = Vec::with_capacity(passing.len() * 2);

    for station in passing {
        let output_id = match (loop_close, origin_id) {
            (Some(close), Some(origin)) if station.station_id == close => origin,
            _ => station.station_id.as_str(),
        };
        let mut push = |time: Option<f64>, order: Option<u32>| {
            samples.push(TimeSpaceSample {
                seq: samples.len(),
                station_id: output_id.to_string(),
                name: station.name.clone(),
                distance: station.distance,
                time,
                order,
            });
        };

        match run.entry_for(&station.station_id) {
            Some(entry) => {
                let arrival = lookup(axis, &station.station_id, &entry.arrival)?;
                let departure = lookup(axis, &station.station_id, &entry.departure)?;
                push(Some(arrival), Some(entry.order));
                push(Some(departure), Some(entry.order));
            }
            None => push(None, None),
        }
    }

    let mut times: Vec<Option<f64>> = samples.iter().map(|s| s.time).collect();
    if let Some(boundary) = correct_midnight(&mut times, axis.day_length()) {
        crate::debug_log!("Train {}: midnight rollover at sample {}", run.id, boundary);
        if let Some(second) = find_rollover(&times) {
            log::warn!(
                "Train {}: time decreases again at sample {second}; only one midnight crossing is corrected",
                run.id
            );
        }
    }
    let unresolved = interpolate_gaps(&mut times);
    if unresolved > 0 {
        log::warn!("Train {}: {unresolved} samples have no bounding time and stay untimed", run.id);
    }

    for (sample, time) in samples.iter_mut().zip(times) {
        sample.time = time;
    }
    Ok(samples)
}

fn lookup(axis: &TimeAxis, station: &str, key: &str) -> Result<f64, EstimateError> {
    axis.value_of(key).ok_or_else(|| EstimateError::UnknownTimeKey {
        station: station.to_string(),
        key: key.to_string(),
    })
}

/// First position whose known time is lower than the previous known time
#[must_use]
pub fn find_rollover(times: &[Option<f64>]) -> Option<usize> {
    let mut last: Option<f64> = None;
    for (i, time) in times.iter().enumerate() {
        let Some(time) = *time else {
            continue;
        };
        if last.is_some_and(|prev| time < prev) {
            return Some(i);
        }
        last = Some(time);
    }
    None
}

/// Add `day_length` to every known time from the first rollover onwards
///
/// Returns the rollover position, if any. Only one crossing is handled.
pub fn correct_midnight(times: &mut [Option<f64>], day_length: f64) -> Option<usize> {
    let boundary = find_rollover(times)?;
    for time in times[boundary..].iter_mut().flatten() {
        *time += day_length;
    }
    Some(boundary)
}

/// Fill each missing time by linear interpolation against position, between
/// the nearest known times on either side
///
/// Positions without a known time on both sides are left `None`; the number
/// of such positions is returned.
pub fn interpolate_gaps(times: &mut [Option<f64>]) -> usize {
    let known: Vec<(usize, f64)> = times
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|t| (i, t)))
        .collect();

    let mut unresolved = 0;
    for (p, time) in times.iter_mut().enumerate() {
        if time.is_some() {
            continue;
        }
        // First known position after p
        let next = known.partition_point(|&(i, _)| i < p);
        match (next.checked_sub(1).map(|k| known[k]), known.get(next)) {
            (Some((p0, v0)), Some(&(p1, v1))) => {
                #[allow(clippy::cast_precision_loss)]
                let ratio = (p - p0) as f64 / (p1 - p0) as f64;
                *time = Some(v0 + (v1 - v0) * ratio);
            }
            _ => unresolved += 1,
        }
    }
    unresolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{entry, linear_graph, train};
    use crate::models::{Direction, RoutingTable};
    use crate::resolver::resolve_passing_stations;
    use approx::assert_relative_eq;

    fn passing(ids: &[(&str, f64)]) -> Vec<PassingStation> {
        ids.iter()
            .map(|&(id, distance)| PassingStation {
                station_id: id.to_string(),
                name: format!("Station {id}"),
                km_post: distance,
                distance,
            })
            .collect()
    }

    #[test]
    fn test_interpolates_passed_station() {
        let run = train(
            "T1",
            "0",
            Direction::Clockwise,
            vec![entry("A", "08:00:00", "08:01:00", 1), entry("C", "08:11:00", "08:12:00", 2)],
        );
        let path = resolve_passing_stations(&linear_graph(), &RoutingTable::default(), &run).expect("path resolves");
        let samples = estimate_time_space(&path, &run, &TimeAxis::half_minute(), None).expect("samples");

        let stations: Vec<_> = samples.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(stations, vec!["A", "A", "B", "C", "C"]);
        assert_eq!(samples[1].time, Some(962.0));
        assert_eq!(samples[3].time, Some(982.0));

        // Departure at A is position 1, arrival at C position 3
        let expected = 962.0 + (982.0 - 962.0) * (2.0 - 1.0) / (3.0 - 1.0);
        assert_eq!(samples[2].time, Some(expected));
        assert_eq!(samples[2].order, None);
        assert_eq!(samples[2].distance, 10.0);
        assert!(!samples[2].is_stop());
        assert_eq!(samples[4].order, Some(2));
        assert!(samples.iter().enumerate().all(|(i, s)| s.seq == i));
    }

    #[test]
    fn test_midnight_rollover() {
        let run = train(
            "T2",
            "0",
            Direction::Clockwise,
            vec![entry("A", "23:50:00", "23:55:00", 1), entry("C", "00:15:00", "00:16:00", 2)],
        );
        let path = passing(&[("A", 0.0), ("B", 10.0), ("C", 30.0)]);
        let samples = estimate_time_space(&path, &run, &TimeAxis::half_minute(), None).expect("samples");
        let times: Vec<f64> = samples.iter().map(|s| s.time.expect("timed")).collect();

        assert_eq!(times[0], 2860.0);
        assert_eq!(times[1], 2870.0);
        assert_eq!(times[3], 2880.0 + 30.0);
        assert_eq!(times[4], 2880.0 + 32.0);
        assert_relative_eq!(times[2], (2870.0 + 2910.0) / 2.0);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_loop_close_is_renamed_to_origin() {
        let run = train(
            "T3",
            "0",
            Direction::Clockwise,
            vec![entry("A", "08:00:00", "08:00:00", 1), entry("1001", "09:00:00", "09:00:00", 2)],
        );
        let path = passing(&[("A", 0.0), ("B", 5.0), ("1001", 10.0)]);
        let samples = estimate_time_space(&path, &run, &TimeAxis::half_minute(), Some("1001")).expect("samples");

        let stations: Vec<_> = samples.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(stations, vec!["A", "A", "B", "A", "A"]);
        assert_eq!(samples[3].time, Some(1080.0));
        assert_eq!(samples[4].seq, 4);
    }

    #[test]
    fn test_unknown_time_key() {
        let run = train(
            "T4",
            "0",
            Direction::Clockwise,
            vec![entry("A", "08:00:00", "08:00:10", 1), entry("C", "09:00:00", "09:00:00", 2)],
        );
        let path = passing(&[("A", 0.0), ("C", 30.0)]);
        let err = estimate_time_space(&path, &run, &TimeAxis::half_minute(), None).expect_err("off-axis key");
        assert_eq!(
            err,
            EstimateError::UnknownTimeKey {
                station: "A".to_string(),
                key: "08:00:10".to_string()
            }
        );
    }

    #[test]
    fn test_interpolate_gaps_exact() {
        let mut times = vec![Some(10.0), None, None, None, Some(18.0), None, Some(30.0)];
        assert_eq!(interpolate_gaps(&mut times), 0);
        assert_eq!(
            times,
            vec![Some(10.0), Some(12.0), Some(14.0), Some(16.0), Some(18.0), Some(24.0), Some(30.0)]
        );
    }

    #[test]
    fn test_interpolate_gaps_unbounded_edges_stay_untimed() {
        let mut times = vec![None, Some(5.0), None, Some(9.0), None, None];
        assert_eq!(interpolate_gaps(&mut times), 3);
        assert_eq!(times, vec![None, Some(5.0), Some(7.0), Some(9.0), None, None]);

        let mut empty: Vec<Option<f64>> = vec![None, None];
        assert_eq!(interpolate_gaps(&mut empty), 2);
    }

    #[test]
    fn test_boundary_sample_in_estimate() {
        // Route continues past the last timetabled station
        let run = train(
            "T5",
            "0",
            Direction::Clockwise,
            vec![entry("A", "08:00:00", "08:00:00", 1), entry("B", "08:10:00", "08:10:00", 2)],
        );
        let path = passing(&[("A", 0.0), ("B", 10.0), ("C", 30.0)]);
        let samples = estimate_time_space(&path, &run, &TimeAxis::half_minute(), None).expect("samples");

        assert_eq!(samples.len(), 5);
        assert_eq!(samples[4].station_id, "C");
        assert_eq!(samples[4].time, None);
    }

    #[test]
    fn test_rollover_detection() {
        assert_eq!(find_rollover(&[Some(1.0), None, Some(3.0), Some(2.0), Some(0.5)]), Some(3));
        assert_eq!(find_rollover(&[Some(1.0), Some(1.0), None]), None);

        let mut times = vec![Some(2870.0), None, Some(5.0), Some(10.0)];
        assert_eq!(correct_midnight(&mut times, 2880.0), Some(2));
        assert_eq!(times, vec![Some(2870.0), None, Some(2885.0), Some(2890.0)]);
    }

    #[test]
    fn test_second_crossing_is_not_corrected() {
        let mut times = vec![Some(2870.0), Some(10.0), Some(2875.0), Some(20.0)];
        assert_eq!(correct_midnight(&mut times, 2880.0), Some(1));
        assert_eq!(times, vec![Some(2870.0), Some(2890.0), Some(5755.0), Some(2900.0)]);
        assert_eq!(find_rollover(&times), Some(3));
    }
}
