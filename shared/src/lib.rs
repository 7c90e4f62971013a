use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Parses the `"lat,lon"` text form typed into the start/end inputs.
impl FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `lat,lon`, got `{s}`"))?;
        let parse = |field: &str, label: &str| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid {label} `{}`", field.trim()))
        };
        let lat = parse(lat, "latitude")?;
        let lon = parse(lon, "longitude")?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(format!("coordinate out of range: {lat}, {lon}"));
        }
        Ok(Self { lat, lon })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl RouteBounds {
    pub fn contains(&self, coord: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.lat)
            && (self.min_lon..=self.max_lon).contains(&coord.lon)
    }

    /// Grow the box by `margin_km` on every side.
    pub fn padded(&self, margin_km: f64) -> Self {
        let lat_margin = margin_km / 111.0;
        let mid_lat = (self.min_lat + self.max_lat) / 2.0;
        let cos_lat = mid_lat.to_radians().cos().abs().max(0.1);
        let lon_margin = margin_km / (111.0 * cos_lat);

        Self {
            min_lat: (self.min_lat - lat_margin).max(-90.0),
            max_lat: (self.max_lat + lat_margin).min(90.0),
            min_lon: (self.min_lon - lon_margin).clamp(-180.0, 180.0),
            max_lon: (self.max_lon + lon_margin).clamp(-180.0, 180.0),
        }
    }
}

/// Transport mode a route was requested for.
///
/// `LastMileWalk` is the walking leg from a parking spot to the destination:
/// it prices and scores like `Walking` but renders dashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportProfile {
    Driving,
    Cycling,
    Walking,
    LastMileWalk,
}

impl TransportProfile {
    /// Identifier understood by the directions provider.
    pub fn provider_id(self) -> &'static str {
        match self {
            TransportProfile::Driving => "driving-car",
            TransportProfile::Cycling => "cycling-regular",
            TransportProfile::Walking | TransportProfile::LastMileWalk => "foot-walking",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransportProfile::Driving => "Driving",
            TransportProfile::Cycling => "Cycling",
            TransportProfile::Walking => "Walking",
            TransportProfile::LastMileWalk => "Last-mile walk",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TransportProfile::Driving => "#6b7280",
            TransportProfile::Cycling => "#16a34a",
            TransportProfile::Walking | TransportProfile::LastMileWalk => "#f59e0b",
        }
    }

    pub fn line_weight(self) -> u8 {
        match self {
            TransportProfile::Cycling => 7,
            TransportProfile::Driving | TransportProfile::Walking => 5,
            TransportProfile::LastMileWalk => 4,
        }
    }

    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            TransportProfile::LastMileWalk => Some("5, 10"),
            _ => None,
        }
    }

    /// Profile whose pricing and health rules apply.
    pub fn metric_profile(self) -> Self {
        match self {
            TransportProfile::LastMileWalk => TransportProfile::Walking,
            other => other,
        }
    }
}

impl fmt::Display for TransportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub path: Vec<Coordinate>,
}

impl RouteGeometry {
    pub fn new(path: Vec<Coordinate>) -> Self {
        Self { path }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRoute {
    pub profile: TransportProfile,
    pub summary: RouteSummary,
    pub geometry: RouteGeometry,
    pub signal_count: u32,
    /// Whole rupees.
    pub cost: u32,
    pub calories: u32,
    pub co2_saved_grams: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSet {
    pub routes: BTreeMap<TransportProfile, EnrichedRoute>,
    pub recommended: TransportProfile,
}

impl RouteSet {
    pub fn get(&self, profile: TransportProfile) -> Option<&EnrichedRoute> {
        self.routes.get(&profile)
    }

    pub fn contains(&self, profile: TransportProfile) -> bool {
        self.routes.contains_key(&profile)
    }

    pub fn driving(&self) -> Option<&EnrichedRoute> {
        self.get(TransportProfile::Driving)
    }

    pub fn recommended_route(&self) -> Option<&EnrichedRoute> {
        self.get(self.recommended)
    }

    /// Reference line for proximity queries.
    pub fn active_geometry(&self) -> Option<&RouteGeometry> {
        self.recommended_route().map(|route| &route.geometry)
    }

    pub fn profiles(&self) -> impl Iterator<Item = TransportProfile> + '_ {
        self.routes.keys().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiCategory {
    Cafe,
    Restaurant,
    Fuel,
    Hotel,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 4] = [
        PoiCategory::Cafe,
        PoiCategory::Restaurant,
        PoiCategory::Fuel,
        PoiCategory::Hotel,
    ];

    /// Value of the OSM `amenity` tag.
    pub fn amenity(self) -> &'static str {
        match self {
            PoiCategory::Cafe => "cafe",
            PoiCategory::Restaurant => "restaurant",
            PoiCategory::Fuel => "fuel",
            PoiCategory::Hotel => "hotel",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PoiCategory::Cafe => "☕",
            PoiCategory::Restaurant => "🍴",
            PoiCategory::Fuel => "⛽",
            PoiCategory::Hotel => "🏨",
        }
    }

    pub fn from_amenity(amenity: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.amenity() == amenity)
    }
}

impl FromStr for PoiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_amenity(&s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown point of interest category `{s}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub coord: Coordinate,
    pub amenity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PointOfInterest {
    pub fn category(&self) -> Option<PoiCategory> {
        PoiCategory::from_amenity(&self.amenity)
    }

    pub fn icon(&self) -> &'static str {
        self.category().map(PoiCategory::icon).unwrap_or("❓")
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.amenity.replacen('_', " ", 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub coord: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ParkingSpot {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Paid Parking")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub icon_code: String,
    pub temp_c: i32,
    pub description: String,
    pub feels_like_c: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherAdvice {
    RainLikely,
    ExtremeHeat,
    GreatForRide,
}

const RAIN_ICONS: [&str; 6] = ["09d", "09n", "10d", "10n", "11d", "11n"];
const EXTREME_HEAT_FEELS_LIKE_C: i32 = 35;

impl WeatherReport {
    pub fn advice(&self) -> WeatherAdvice {
        if RAIN_ICONS.contains(&self.icon_code.as_str()) {
            WeatherAdvice::RainLikely
        } else if self.feels_like_c > EXTREME_HEAT_FEELS_LIKE_C {
            WeatherAdvice::ExtremeHeat
        } else {
            WeatherAdvice::GreatForRide
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lon_text() {
        let coord: Coordinate = " 18.5204 , 73.8567 ".parse().unwrap();
        assert_eq!(coord, Coordinate::new(18.5204, 73.8567));
    }

    #[test]
    fn rejects_addresses_and_out_of_range() {
        assert!("FC Road, Pune".parse::<Coordinate>().is_err());
        assert!("Shivajinagar".parse::<Coordinate>().is_err());
        assert!("95.0,10.0".parse::<Coordinate>().is_err());
    }

    #[test]
    fn last_mile_walk_uses_walking_rules_but_dashed_style() {
        let profile = TransportProfile::LastMileWalk;
        assert_eq!(profile.metric_profile(), TransportProfile::Walking);
        assert_eq!(profile.provider_id(), "foot-walking");
        assert_eq!(profile.dash_array(), Some("5, 10"));
        assert_eq!(TransportProfile::Walking.dash_array(), None);
    }

    #[test]
    fn profile_serializes_camel_case() {
        let json = serde_json::to_string(&TransportProfile::LastMileWalk).unwrap();
        assert_eq!(json, "\"lastMileWalk\"");
    }

    #[test]
    fn poi_display_name_falls_back_to_amenity() {
        let poi = PointOfInterest {
            coord: Coordinate::new(0.0, 0.0),
            amenity: "fast_food".into(),
            name: None,
        };
        assert_eq!(poi.display_name(), "fast food");
        assert_eq!(poi.icon(), "❓");

        let cafe = PointOfInterest {
            amenity: "cafe".into(),
            name: Some("Vaishali".into()),
            ..poi
        };
        assert_eq!(cafe.display_name(), "Vaishali");
        assert_eq!(cafe.icon(), "☕");
    }

    #[test]
    fn weather_advice_prefers_rain_over_heat() {
        let mut report = WeatherReport {
            icon_code: "10d".into(),
            temp_c: 38,
            description: "light rain".into(),
            feels_like_c: 40,
        };
        assert_eq!(report.advice(), WeatherAdvice::RainLikely);
        report.icon_code = "01d".into();
        assert_eq!(report.advice(), WeatherAdvice::ExtremeHeat);
        report.feels_like_c = 35;
        assert_eq!(report.advice(), WeatherAdvice::GreatForRide);
    }

    #[test]
    fn padded_bounds_grow_on_every_side() {
        let bounds = RouteBounds {
            min_lat: 18.50,
            max_lat: 18.53,
            min_lon: 73.84,
            max_lon: 73.87,
        };
        let padded = bounds.padded(1.0);
        assert!(padded.min_lat < bounds.min_lat && padded.max_lat > bounds.max_lat);
        assert!(padded.min_lon < bounds.min_lon && padded.max_lon > bounds.max_lon);
        assert!(padded.contains(Coordinate::new(18.515, 73.855)));
    }
}
