use tracing::{info, warn};

use crate::{
    error::PipelineError,
    model::{FALLBACK_TIMEZONE, LocationQuery, ResolvedLocation},
    provider::WeatherSource,
};

/// Turn free-text city input into coordinates, names and an IANA zone.
///
/// Blank input fails with [`PipelineError::EmptyInput`] before any request is
/// made. A missing embedded timezone triggers a coordinate lookup; if that
/// lookup fails or comes back empty the location gets [`FALLBACK_TIMEZONE`]
/// and no error is reported.
pub async fn resolve(
    source: &dyn WeatherSource,
    city_text: &str,
) -> Result<ResolvedLocation, PipelineError> {
    let query = LocationQuery::parse(city_text)?;

    let best = source
        .search_city(query.as_str())
        .await
        .map_err(PipelineError::network)?
        .ok_or(PipelineError::NotFound)?;

    let timezone_id = match best.timezone {
        Some(tz) => tz,
        None => fallback_timezone(source, best.latitude, best.longitude).await,
    };

    info!(
        query = query.as_str(),
        name = %best.name,
        latitude = best.latitude,
        longitude = best.longitude,
        timezone = %timezone_id,
        "Resolved location"
    );

    Ok(ResolvedLocation {
        latitude: best.latitude,
        longitude: best.longitude,
        display_name: best.name,
        country: best.country,
        timezone_id,
    })
}

async fn fallback_timezone(source: &dyn WeatherSource, latitude: f64, longitude: f64) -> String {
    match source.lookup_timezone(latitude, longitude).await {
        Ok(Some(tz)) => tz,
        Ok(None) => {
            warn!(latitude, longitude, "Timezone lookup returned nothing, using UTC");
            FALLBACK_TIMEZONE.to_string()
        }
        Err(e) => {
            warn!(
                latitude,
                longitude,
                error = %format!("{e:#}"),
                "Timezone lookup failed, using UTC"
            );
            FALLBACK_TIMEZONE.to_string()
        }
    }
}
