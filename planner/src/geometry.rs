use crate::models::{Coordinate, RouteBounds};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Shortest distance in meters from `point` to the polyline `line`.
///
/// Each segment is projected onto a local equirectangular plane centred on
/// `point`, which stays well under a metre off the geodesic answer for
/// city-scale segments. Returns `None` for an empty line.
pub fn point_to_line_distance_m(point: Coordinate, line: &[Coordinate]) -> Option<f64> {
    match line {
        [] => None,
        [only] => Some(haversine_m(point, *only)),
        _ => {
            let cos_lat = point.lat.to_radians().cos();
            let project = |c: Coordinate| -> (f64, f64) {
                let mut dlon = c.lon - point.lon;
                if dlon > 180.0 {
                    dlon -= 360.0;
                } else if dlon < -180.0 {
                    dlon += 360.0;
                }
                (
                    dlon.to_radians() * cos_lat * EARTH_RADIUS_M,
                    (c.lat - point.lat).to_radians() * EARTH_RADIUS_M,
                )
            };

            line.windows(2)
                .map(|w| distance_to_segment(project(w[0]), project(w[1])))
                .min_by(f64::total_cmp)
        }
    }
}

/// Distance from the origin to segment `a`–`b` in the projected plane.
fn distance_to_segment(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f64::EPSILON {
        0.0
    } else {
        (-(a.0 * dx + a.1 * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (x, y) = (a.0 + t * dx, a.1 + t * dy);
    (x * x + y * y).sqrt()
}

pub fn bounding_box(line: &[Coordinate]) -> Option<RouteBounds> {
    let first = line.first()?;
    let initial = RouteBounds {
        min_lat: first.lat,
        max_lat: first.lat,
        min_lon: first.lon,
        max_lon: first.lon,
    };
    Some(line.iter().fold(initial, |b, c| RouteBounds {
        min_lat: b.min_lat.min(c.lat),
        max_lat: b.max_lat.max(c.lat),
        min_lon: b.min_lon.min(c.lon),
        max_lon: b.max_lon.max(c.lon),
    }))
}
