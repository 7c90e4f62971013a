use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{join_url, DirectionsProvider, GatewayError};
use crate::config::ServiceConfig;
use crate::models::{Coordinate, RawRoute, RouteGeometry, RouteSummary, TransportProfile};

/// OpenRouteService `GET /v2/directions/{profile}` client.
pub struct OrsDirections {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OrsDirections {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            base_url: config.directions_url.clone(),
            api_key: config.ors_api_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    geometry: LineGeometry,
    #[serde(default)]
    properties: RouteProperties,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    /// `[lon, lat]` or `[lon, lat, elevation]`.
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct RouteProperties {
    #[serde(default)]
    summary: OrsSummary,
}

/// ORS leaves out zero-valued fields.
#[derive(Debug, Default, Deserialize)]
struct OrsSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Plain(String),
    Detailed { message: Option<String> },
}

/// Human-readable message from an ORS error body, if it carries one.
pub(crate) fn provider_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.error {
        ErrorDetail::Plain(message) => message,
        ErrorDetail::Detailed { message } => message?,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn lon_lat(coord: Coordinate) -> String {
    format!("{},{}", coord.lon, coord.lat)
}

impl DirectionsResponse {
    fn into_raw_route(self) -> Option<RawRoute> {
        let feature = self.features.into_iter().next()?;
        let path = feature
            .geometry
            .coordinates
            .iter()
            .filter_map(|pos| match pos.as_slice() {
                [lon, lat, ..] => Some(Coordinate::new(*lat, *lon)),
                _ => None,
            })
            .collect();
        let summary = feature.properties.summary;
        Some(RawRoute {
            summary: RouteSummary {
                distance_m: summary.distance.max(0.0),
                duration_s: summary.duration.max(0.0),
            },
            geometry: RouteGeometry::new(path),
        })
    }
}

#[async_trait]
impl DirectionsProvider for OrsDirections {
    async fn get_route(
        &self,
        profile: TransportProfile,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<RawRoute, GatewayError> {
        let url = join_url(
            &self.base_url,
            &format!("v2/directions/{}", profile.provider_id()),
        );
        let mut params = vec![("start", lon_lat(start)), ("end", lon_lat(end))];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        tracing::debug!("requesting {profile} route {start} -> {end}");
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!("{profile} directions request failed: {err}");
                GatewayError::route_failed(profile)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{profile} directions returned {status}: {body}");
            return Err(match provider_error_message(&body) {
                Some(message) => GatewayError::RouteUnavailable { profile, message },
                None => GatewayError::route_failed(profile),
            });
        }

        let parsed: DirectionsResponse = response.json().await.map_err(|err| {
            tracing::warn!("undecodable {profile} directions response: {err}");
            GatewayError::route_failed(profile)
        })?;
        let route = parsed
            .into_raw_route()
            .ok_or_else(|| GatewayError::route_failed(profile))?;

        tracing::debug!(
            "{profile} route: {:.0} m, {:.0} s, {} points",
            route.summary.distance_m,
            route.summary.duration_s,
            route.geometry.path.len()
        );
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geojson_route() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": [[73.8567, 18.5204], [73.8600, 18.5250, 560.0]] },
                "properties": { "summary": { "distance": 812.4, "duration": 171.9 } }
            }]
        }"#;
        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        let route = parsed.into_raw_route().unwrap();
        assert_eq!(route.summary.distance_m, 812.4);
        assert_eq!(route.summary.duration_s, 171.9);
        assert_eq!(
            route.geometry.path,
            vec![Coordinate::new(18.5204, 73.8567), Coordinate::new(18.5250, 73.8600)]
        );
    }

    #[test]
    fn missing_summary_fields_default_to_zero() {
        let body = r#"{ "features": [{ "geometry": { "coordinates": [[73.85, 18.52]] }, "properties": { "summary": {} } }] }"#;
        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        let route = parsed.into_raw_route().unwrap();
        assert_eq!(route.summary, RouteSummary::default());
    }

    #[test]
    fn empty_feature_collection_has_no_route() {
        let parsed: DirectionsResponse = serde_json::from_str(r#"{ "features": [] }"#).unwrap();
        assert!(parsed.into_raw_route().is_none());
    }

    #[test]
    fn extracts_provider_messages() {
        assert_eq!(
            provider_error_message(r#"{"error":{"code":2010,"message":"Could not find routable point within a radius of 350.0 meters"}}"#)
                .as_deref(),
            Some("Could not find routable point within a radius of 350.0 meters")
        );
        assert_eq!(
            provider_error_message(r#"{"error":"Access to this API has been disallowed"}"#).as_deref(),
            Some("Access to this API has been disallowed")
        );
        assert_eq!(provider_error_message(r#"{"error":{"code":2099}}"#), None);
        assert_eq!(provider_error_message("<html>bad gateway</html>"), None);
    }
}
