use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{join_url, GatewayError, WeatherProvider};
use crate::config::ServiceConfig;
use crate::models::{Coordinate, WeatherReport};

/// OpenWeatherMap current-conditions client (metric units).
pub struct OpenWeatherMap {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherMap {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            base_url: config.weather_url.clone(),
            api_key: config.owm_api_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    icon: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
}

impl CurrentWeather {
    fn into_report(self) -> Option<WeatherReport> {
        let condition = self.weather.into_iter().next()?;
        Some(WeatherReport {
            icon_code: condition.icon,
            temp_c: self.main.temp.round() as i32,
            description: condition.description,
            feels_like_c: self.main.feels_like.round() as i32,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMap {
    async fn current_weather(&self, at: Coordinate) -> Result<WeatherReport, GatewayError> {
        let url = join_url(&self.base_url, "data/2.5/weather");
        let mut params = vec![
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("units", "metric".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("appid", key.clone()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|err| GatewayError::WeatherUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::WeatherUnavailable(format!(
                "weather service returned {status}"
            )));
        }

        let parsed: CurrentWeather = response
            .json()
            .await
            .map_err(|err| GatewayError::WeatherUnavailable(err.to_string()))?;
        parsed
            .into_report()
            .ok_or_else(|| GatewayError::WeatherUnavailable("no weather conditions in response".into()))
    }
}
