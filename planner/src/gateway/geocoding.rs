use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{join_url, GatewayError, GeocodeResult, Geocoder};
use crate::config::ServiceConfig;
use crate::models::Coordinate;

/// OpenRouteService (Pelias) forward geocoder, biased towards the
/// configured country and focus point.
pub struct OrsGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    country: String,
    focus: Coordinate,
}

impl OrsGeocoder {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            base_url: config.geocoding_url.clone(),
            api_key: config.ors_api_key.clone(),
            country: config.geocode_country.clone(),
            focus: config.geocode_focus,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    geometry: PointGeometry,
    #[serde(default)]
    properties: PlaceProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceProperties {
    label: Option<String>,
    name: Option<String>,
}

impl GeocodeResponse {
    fn first_match(self, text: &str) -> Option<GeocodeResult> {
        self.features.into_iter().find_map(|feature| {
            let [lon, lat, ..] = feature.geometry.coordinates.as_slice() else {
                return None;
            };
            let display_name = feature
                .properties
                .label
                .or(feature.properties.name)
                .unwrap_or_else(|| text.to_string());
            Some(GeocodeResult {
                coord: Coordinate::new(*lat, *lon),
                display_name,
            })
        })
    }
}

#[async_trait]
impl Geocoder for OrsGeocoder {
    async fn search(&self, text: &str) -> Result<GeocodeResult, GatewayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::AddressNotFound(String::new()));
        }

        let url = join_url(&self.base_url, "geocode/search");
        let focus = format!("{},{}", self.focus.lat, self.focus.lon);
        let mut params = vec![
            ("text", text.to_string()),
            ("boundary.country", self.country.clone()),
            ("boundary.circle.lat_lon", focus),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        tracing::debug!("geocoding `{text}`");
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|err| GatewayError::GeocodingUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::GeocodingUnavailable(format!(
                "geocoder returned {status}"
            )));
        }

        let parsed: GeocodeResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::GeocodingUnavailable(err.to_string()))?;
        parsed
            .first_match(text)
            .ok_or_else(|| GatewayError::AddressNotFound(text.to_string()))
    }
}
