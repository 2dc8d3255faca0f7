/// A drawing-space coordinate: X from time, Y from line position
pub type Point = (f64, f64);

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// Lengths of the consecutive pieces of a polyline.
///
/// # Examples
/// ```
/// use rail_diagram::geometry::segment_lengths;
///
/// let lengths = segment_lengths(&[(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]);
/// assert_eq!(lengths, vec![5.0, 6.0]);
/// ```
#[must_use]
pub fn segment_lengths(points: &[Point]) -> Vec<f64> {
    points.windows(2).map(|w| distance(w[0], w[1])).collect()
}

/// Resolves a distance along a polyline to the point at that distance.
///
/// Distances beyond either end clamp to the end points. Returns `None` for an
/// empty polyline.
///
/// # Arguments
/// * `points` - Polyline vertices in drawing order
/// * `along` - Distance from the first vertex, measured along the path
#[must_use]
pub fn point_at_distance(points: &[Point], along: f64) -> Option<Point> {
    let first = *points.first()?;
    if along <= 0.0 {
        return Some(first);
    }

    let mut travelled = 0.0;
    for w in points.windows(2) {
        let length = distance(w[0], w[1]);
        if length > 0.0 && travelled + length >= along {
            let t = (along - travelled) / length;
            return Some((w[0].0 + t * (w[1].0 - w[0].0), w[0].1 + t * (w[1].1 - w[0].1)));
        }
        travelled += length;
    }

    points.last().copied()
}

/// Rounds to two decimals, nudging exact halves upwards
#[must_use]
pub fn round2(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0).round() / 100.0
}
