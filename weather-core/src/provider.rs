use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// Best geocoding match for a city name.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

/// Current conditions as reported by the forecast service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub windspeed: f64,
}

/// The three remote lookups the pipeline depends on.
///
/// `Ok(None)` means the service answered but had nothing for the request;
/// `Err` covers transport, status and decoding failures.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn search_city(&self, name: &str) -> anyhow::Result<Option<GeoMatch>>;

    async fn lookup_timezone(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> anyhow::Result<Option<String>>;

    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> anyhow::Result<Option<CurrentConditions>>;
}
