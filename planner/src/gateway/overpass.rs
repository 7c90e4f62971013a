use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{GatewayError, OsmDataProvider, OsmElement, OsmQuery, QueryArea, TagFilter};
use crate::config::ServiceConfig;
use crate::models::Coordinate;

/// Overpass API client. Every request carries the configured timeout; a
/// timeout is reported like any other failure, as `DataServiceBusy`.
pub struct OverpassClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl OverpassClient {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            endpoint: config.overpass_url.clone(),
            timeout: config.overpass_timeout(),
        }
    }
}

impl QueryArea {
    fn to_ql(&self) -> String {
        match self {
            // Overpass bbox order is south,west,north,east.
            QueryArea::Bounds(b) => {
                format!("({},{},{},{})", b.min_lat, b.min_lon, b.max_lat, b.max_lon)
            }
            QueryArea::Around { center, radius_m } => {
                format!("(around:{},{},{})", radius_m.round(), center.lat, center.lon)
            }
        }
    }
}

impl TagFilter {
    fn to_ql(&self) -> String {
        match self {
            TagFilter::Equals(key, value) => format!("[\"{key}\"=\"{value}\"]"),
            TagFilter::OneOf(key, values) => {
                format!("[\"{key}\"~\"^({})$\"]", values.join("|"))
            }
        }
    }
}

impl OsmQuery {
    /// Overpass QL for this query, with elements returned as JSON and ways
    /// collapsed to their centre.
    pub fn to_overpass_ql(&self, timeout: Duration) -> String {
        let tags: String = self.filters.iter().map(TagFilter::to_ql).collect();
        let area = self.area.to_ql();
        let mut statements = format!("node{tags}{area};");
        if self.include_ways {
            statements.push_str(&format!("way{tags}{area};"));
        }
        format!(
            "[out:json][timeout:{}];({statements});out center;",
            timeout.as_secs()
        )
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

impl RawElement {
    fn into_element(self) -> Option<OsmElement> {
        let coord = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Coordinate::new(lat, lon),
            (_, _, Some(center)) => Coordinate::new(center.lat, center.lon),
            _ => return None,
        };
        Some(OsmElement {
            coord,
            tags: self.tags,
        })
    }
}

#[async_trait]
impl OsmDataProvider for OverpassClient {
    async fn query_nodes(&self, query: &OsmQuery) -> Result<Vec<OsmElement>, GatewayError> {
        let ql = query.to_overpass_ql(self.timeout);
        tracing::debug!("overpass query: {ql}");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("data", ql.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| busy("request", err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::DataServiceBusy(format!(
                "overpass returned {status}"
            )));
        }

        let parsed: OverpassResponse = response.json().await.map_err(|err| busy("response", err))?;
        let elements: Vec<OsmElement> = parsed
            .elements
            .into_iter()
            .filter_map(RawElement::into_element)
            .collect();
        tracing::debug!("overpass returned {} elements", elements.len());
        Ok(elements)
    }
}

fn busy(stage: &str, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::DataServiceBusy(format!("overpass {stage} timed out"))
    } else {
        GatewayError::DataServiceBusy(format!("overpass {stage} failed: {err}"))
    }
}
