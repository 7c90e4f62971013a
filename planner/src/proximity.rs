use crate::geometry::point_to_line_distance_m;
use crate::models::{Coordinate, ParkingSpot, PointOfInterest};

/// Anything with a position that can be measured against a route line.
pub trait Located {
    fn location(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn location(&self) -> Coordinate {
        *self
    }
}

impl Located for PointOfInterest {
    fn location(&self) -> Coordinate {
        self.coord
    }
}

impl Located for ParkingSpot {
    fn location(&self) -> Coordinate {
        self.coord
    }
}

/// True when `point` lies strictly closer than `threshold_m` to `line`.
/// Nothing is near an empty line.
pub fn is_near_line(point: Coordinate, line: &[Coordinate], threshold_m: f64) -> bool {
    point_to_line_distance_m(point, line).is_some_and(|d| d < threshold_m)
}

/// Keep the candidates closer than `threshold_m` to `line`, in input order
/// and otherwise untouched.
pub fn filter_near_line<T: Located>(
    candidates: impl IntoIterator<Item = T>,
    line: &[Coordinate],
    threshold_m: f64,
) -> Vec<T> {
    candidates
        .into_iter()
        .filter(|c| is_near_line(c.location(), line, threshold_m))
        .collect()
}

pub fn count_near_line<T: Located>(points: &[T], line: &[Coordinate], threshold_m: f64) -> usize {
    points
        .iter()
        .filter(|p| is_near_line(p.location(), line, threshold_m))
        .count()
}
