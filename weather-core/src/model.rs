use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Zone used when a location's timezone cannot be determined.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Raw city text as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Accepts any text that is non-empty after trimming.
    pub fn parse(text: &str) -> Result<Self, PipelineError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    pub country: Option<String>,
    /// IANA zone name, [`FALLBACK_TIMEZONE`] when unresolvable.
    pub timezone_id: String,
}

impl ResolvedLocation {
    /// "Name, Country", or just the name when the country is unknown.
    pub fn title(&self) -> String {
        match self.country.as_deref().filter(|c| !c.is_empty()) {
            Some(country) => format!("{}, {}", self.display_name, country),
            None => self.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_celsius: f64,
    pub wind_speed_kmh: f64,
    pub fetched_at_utc: DateTime<Utc>,
    pub location: ResolvedLocation,
}

/// The two clock badges shown alongside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveClockPair {
    /// Current time in the resolved location's zone.
    pub primary_formatted: String,
    /// Current time in the reference zone.
    pub reference_formatted: String,
}
