use chrono::Utc;
use tracing::info;

use crate::{
    error::PipelineError,
    model::{ResolvedLocation, WeatherSnapshot},
    provider::WeatherSource,
};

/// Fetch current conditions for an already resolved location.
///
/// Values are passed through as °C and km/h. `fetched_at_utc` is the moment
/// the response arrived.
pub async fn fetch_current(
    source: &dyn WeatherSource,
    location: &ResolvedLocation,
) -> Result<WeatherSnapshot, PipelineError> {
    let current = source
        .current_weather(location.latitude, location.longitude)
        .await
        .map_err(PipelineError::network)?
        .ok_or(PipelineError::DataUnavailable)?;

    let fetched_at_utc = Utc::now();

    info!(
        location = %location.title(),
        temperature_c = current.temperature,
        wind_kmh = current.windspeed,
        "Fetched current weather"
    );

    Ok(WeatherSnapshot {
        temperature_celsius: current.temperature,
        wind_speed_kmh: current.windspeed,
        fetched_at_utc,
        location: location.clone(),
    })
}
