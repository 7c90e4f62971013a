//! Typed access to the third-party services the planner depends on.
//!
//! Each provider is a trait so the engine and the event adapter can run
//! against in-memory doubles; the HTTP implementations speak the public
//! JSON contracts of OpenRouteService, Overpass and OpenWeatherMap.

pub mod directions;
pub mod geocoding;
pub mod overpass;
pub mod weather;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::models::{Coordinate, RawRoute, RouteBounds, TransportProfile, WeatherReport};

pub use directions::OrsDirections;
pub use geocoding::OrsGeocoder;
pub use overpass::OverpassClient;
pub use weather::OpenWeatherMap;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("route for {profile} unavailable: {message}")]
    RouteUnavailable {
        profile: TransportProfile,
        message: String,
    },
    #[error("no geocoding result for `{0}`")]
    AddressNotFound(String),
    #[error("geocoding request failed: {0}")]
    GeocodingUnavailable(String),
    #[error("map data service busy: {0}")]
    DataServiceBusy(String),
    #[error("weather request failed: {0}")]
    WeatherUnavailable(String),
}

impl GatewayError {
    pub fn route_failed(profile: TransportProfile) -> Self {
        GatewayError::RouteUnavailable {
            profile,
            message: format!("Route for {} failed.", profile.label().to_lowercase()),
        }
    }

    /// Short sentence suitable for the status line.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::RouteUnavailable { message, .. } => message.clone(),
            GatewayError::AddressNotFound(_) => "Address not found.".into(),
            GatewayError::GeocodingUnavailable(_) => {
                "Could not search for that address. Please try again.".into()
            }
            GatewayError::DataServiceBusy(_) => "Map data server is busy. Please try again.".into(),
            GatewayError::WeatherUnavailable(_) => "Could not load weather data.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coord: Coordinate,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryArea {
    Bounds(RouteBounds),
    Around { center: Coordinate, radius_m: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagFilter {
    Equals(String, String),
    /// Exact match against any of the listed values.
    OneOf(String, Vec<String>),
}

impl TagFilter {
    pub fn equals(key: &str, value: &str) -> Self {
        TagFilter::Equals(key.into(), value.into())
    }
}

/// OSM elements to fetch: nodes (and optionally ways, reported at their
/// centre) inside `area` carrying every tag in `filters`.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmQuery {
    pub area: QueryArea,
    pub filters: Vec<TagFilter>,
    pub include_ways: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OsmElement {
    pub coord: Coordinate,
    pub tags: BTreeMap<String, String>,
}

impl OsmElement {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn get_route(
        &self,
        profile: TransportProfile,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<RawRoute, GatewayError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, text: &str) -> Result<GeocodeResult, GatewayError>;
}

#[async_trait]
pub trait OsmDataProvider: Send + Sync {
    async fn query_nodes(&self, query: &OsmQuery) -> Result<Vec<OsmElement>, GatewayError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherReport, GatewayError>;
}

/// The four collaborators the event adapter talks to.
#[derive(Clone)]
pub struct Gateways {
    pub directions: Arc<dyn DirectionsProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub osm: Arc<dyn OsmDataProvider>,
    pub weather: Arc<dyn WeatherProvider>,
}

impl Gateways {
    pub fn http(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        let client = http_client()?;
        Ok(Self {
            directions: Arc::new(OrsDirections::new(client.clone(), config)),
            geocoder: Arc::new(OrsGeocoder::new(client.clone(), config)),
            osm: Arc::new(OverpassClient::new(client.clone(), config)),
            weather: Arc::new(OpenWeatherMap::new(client, config)),
        })
    }
}

/// Shared connection pool. No overall timeout: only the Overpass client sets
/// one, per request.
pub fn http_client() -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!("planner/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
