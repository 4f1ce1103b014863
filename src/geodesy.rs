//! Geodesic primitives shared by the graph model, the planner, and the
//! tracker. All coordinates are lon/lat in degrees (`geo::Point`, x = lon,
//! y = lat); all distances are meters on a spherical Earth.

use geo::Point;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points via the haversine formula.
///
/// Symmetric, and zero iff both points are equal. Edge weights in the
/// footpath graph are exactly this distance between the edge endpoints.
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let dlat = (b.y() - a.y()).to_radians();
    let dlon = (b.x() - a.x()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial compass bearing from `a` to `b`, degrees in `[0, 360)`.
pub fn initial_bearing(a: Point<f64>, b: Point<f64>) -> f64 {
    let dlon = (b.x() - a.x()).to_radians();
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Distance from `point` to the nearest point on the segment `a`-`b`.
///
/// The projection parameter is computed in a locally flat lon/lat
/// approximation and clamped to `[0, 1]`, so the result measures against
/// the segment rather than the infinite line. The distance to the
/// projected point itself is geodesic. A degenerate segment (`a == b`)
/// falls back to plain point distance.
pub fn point_to_segment_distance(point: Point<f64>, a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();

    if dx == 0.0 && dy == 0.0 {
        return haversine_distance(point, a);
    }

    let t = ((point.x() - a.x()) * dx + (point.y() - a.y()) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    let projection = Point::new(a.x() + t * dx, a.y() + t * dy);

    haversine_distance(point, projection)
}

const CARDINALS: [&str; 8] = [
    "North",
    "Northeast",
    "East",
    "Southeast",
    "South",
    "Southwest",
    "West",
    "Northwest",
];

/// Human-readable 8-way compass direction for a bearing in degrees.
pub fn cardinal(bearing: f64) -> &'static str {
    let index = ((bearing / 45.0).round() as usize) % 8;
    CARDINALS[index]
}
