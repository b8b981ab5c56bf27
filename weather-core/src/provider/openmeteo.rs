use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::Config;

use super::{CurrentConditions, GeoMatch, WeatherSource};

const USER_AGENT: &str = concat!("weather-now/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo geocoding, timezone and forecast client.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    geocoding_base_url: String,
    api_base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            geocoding_base_url: config.geocoding_base_url.trim_end_matches('/').to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        debug!(url, what, "Sending Open-Meteo request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse Open-Meteo {what} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OmGeoResult {
    latitude: f64,
    longitude: f64,
    name: String,
    country: Option<String>,
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    // Omitted entirely when nothing matches.
    #[serde(default)]
    results: Vec<OmGeoResult>,
}

#[derive(Debug, Deserialize)]
struct OmTimezoneResponse {
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: Option<OmCurrentWeather>,
}

#[async_trait]
impl WeatherSource for OpenMeteoProvider {
    #[instrument(skip(self))]
    async fn search_city(&self, name: &str) -> Result<Option<GeoMatch>> {
        let url = format!("{}/search", self.geocoding_base_url);

        let parsed: OmSearchResponse = self
            .get_json(
                &url,
                &[("name", name.to_string()), ("count", "1".to_string())],
                "geocoding",
            )
            .await?;

        Ok(parsed.results.into_iter().next().map(|r| GeoMatch {
            latitude: r.latitude,
            longitude: r.longitude,
            name: r.name,
            country: r.country,
            timezone: r.timezone.filter(|tz| !tz.trim().is_empty()),
        }))
    }

    #[instrument(skip(self))]
    async fn lookup_timezone(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = format!("{}/timezone", self.api_base_url);

        let parsed: OmTimezoneResponse = self
            .get_json(
                &url,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                ],
                "timezone",
            )
            .await?;

        Ok(parsed.timezone.filter(|tz| !tz.trim().is_empty()))
    }

    #[instrument(skip(self))]
    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<CurrentConditions>> {
        let url = format!("{}/forecast", self.api_base_url);

        let parsed: OmForecastResponse = self
            .get_json(
                &url,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("current_weather", "true".to_string()),
                    ("timezone", "UTC".to_string()),
                ],
                "forecast",
            )
            .await?;

        Ok(parsed.current_weather.map(|cw| CurrentConditions {
            temperature: cw.temperature,
            windspeed: cw.windspeed,
        }))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
