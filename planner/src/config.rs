use std::{fs::File, io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use shared::Coordinate;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for the whole planner. Every field has a default so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub routing: RoutingConfig,
    pub proximity: ProximityConfig,
    pub pricing: PricingConfig,
    pub health: HealthConfig,
    pub services: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Walking is only offered when the driving route is strictly shorter.
    pub max_walking_distance_m: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_walking_distance_m: 2_500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub signal_threshold_m: f64,
    pub poi_threshold_m: f64,
    pub parking_radius_m: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            signal_threshold_m: 20.0,
            poi_threshold_m: 25.0,
            parking_radius_m: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Driving is billed as an auto-rickshaw ride.
    pub auto_rickshaw: AutoRickshawFare,
    pub bike_share: BikeShareFare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRickshawFare {
    pub base_fare: f64,
    pub per_km: f64,
    pub min_km: f64,
}

impl Default for AutoRickshawFare {
    fn default() -> Self {
        Self {
            base_fare: 25.0,
            per_km: 17.0,
            min_km: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BikeShareFare {
    pub unlock_fee: f64,
    pub per_minute: f64,
}

impl Default for BikeShareFare {
    fn default() -> Self {
        Self {
            unlock_fee: 10.0,
            per_minute: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub met_walking: f64,
    pub met_cycling: f64,
    pub car_emissions_g_per_km: f64,
    pub default_weight_kg: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            met_walking: 3.5,
            met_cycling: 4.0,
            car_emissions_g_per_km: 130.0,
            default_weight_kg: 65.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub directions_url: String,
    pub geocoding_url: String,
    pub overpass_url: String,
    pub weather_url: String,
    pub ors_api_key: Option<String>,
    pub owm_api_key: Option<String>,
    pub overpass_timeout_secs: u64,
    pub geocode_country: String,
    pub geocode_focus: Coordinate,
    pub weather_location: Coordinate,
    pub city_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            directions_url: "https://api.openrouteservice.org".into(),
            geocoding_url: "https://api.openrouteservice.org".into(),
            overpass_url: "https://overpass.kumi.systems/api/interpreter".into(),
            weather_url: "https://api.openweathermap.org".into(),
            ors_api_key: None,
            owm_api_key: None,
            overpass_timeout_secs: 8,
            geocode_country: "IND".into(),
            geocode_focus: Coordinate::new(18.52, 73.85),
            weather_location: Coordinate::new(18.5204, 73.8567),
            city_name: "Pune".into(),
        }
    }
}

impl ServiceConfig {
    pub fn overpass_timeout(&self) -> Duration {
        Duration::from_secs(self.overpass_timeout_secs)
    }
}

impl PlannerConfig {
    pub fn from_reader(reader: impl io::Read) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_reader(File::open(path)?)
    }

    /// Optional JSON file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("loading planner config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let services = &mut self.services;
        if let Some(key) = lookup("ORS_API_KEY") {
            services.ors_api_key = Some(key);
        }
        if let Some(key) = lookup("OWM_API_KEY") {
            services.owm_api_key = Some(key);
        }
        if let Some(url) = lookup("ORS_BASE_URL") {
            services.directions_url = url.clone();
            services.geocoding_url = url;
        }
        if let Some(url) = lookup("ORS_GEOCODE_URL") {
            services.geocoding_url = url;
        }
        if let Some(url) = lookup("OVERPASS_URL") {
            services.overpass_url = url;
        }
        if let Some(url) = lookup("OWM_BASE_URL") {
            services.weather_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("routing.max_walking_distance_m", self.routing.max_walking_distance_m),
            ("proximity.signal_threshold_m", self.proximity.signal_threshold_m),
            ("proximity.poi_threshold_m", self.proximity.poi_threshold_m),
            ("proximity.parking_radius_m", self.proximity.parking_radius_m),
            ("pricing.auto_rickshaw.base_fare", self.pricing.auto_rickshaw.base_fare),
            ("pricing.auto_rickshaw.per_km", self.pricing.auto_rickshaw.per_km),
            ("pricing.auto_rickshaw.min_km", self.pricing.auto_rickshaw.min_km),
            ("pricing.bike_share.unlock_fee", self.pricing.bike_share.unlock_fee),
            ("pricing.bike_share.per_minute", self.pricing.bike_share.per_minute),
            ("health.met_walking", self.health.met_walking),
            ("health.met_cycling", self.health.met_cycling),
            ("health.car_emissions_g_per_km", self.health.car_emissions_g_per_km),
        ];
        if let Some((name, value)) = non_negative
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")));
        }
        if !(self.health.default_weight_kg.is_finite() && self.health.default_weight_kg > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "health.default_weight_kg must be > 0, got {}",
                self.health.default_weight_kg
            )));
        }
        if self.services.overpass_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "services.overpass_timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}
