pub use shared::{
    Coordinate, EnrichedRoute, ParkingSpot, PoiCategory, PointOfInterest, RouteBounds,
    RouteGeometry, RouteSet, RouteSummary, TransportProfile, WeatherAdvice, WeatherReport,
};

use serde::{Deserialize, Serialize};

/// Inputs of one planning run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: Coordinate,
    pub end: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

impl RouteRequest {
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Self {
            start,
            end,
            weight_kg: None,
        }
    }

    pub fn weight_or(&self, default_kg: f64) -> f64 {
        rider_weight_or(self.weight_kg, default_kg)
    }
}

/// Rider weight, falling back to `default_kg` for missing or nonsensical input.
pub fn rider_weight_or(weight_kg: Option<f64>, default_kg: f64) -> f64 {
    weight_kg
        .filter(|w| w.is_finite() && *w > 0.0)
        .unwrap_or(default_kg)
}

/// A route exactly as the directions provider returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRoute {
    pub summary: RouteSummary,
    pub geometry: RouteGeometry,
}
