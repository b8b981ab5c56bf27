//! Human-friendly output for a lookup result.

use weather_core::{LiveClockPair, PipelineError, WeatherSnapshot, clock};

const REFERENCE_LABEL: &str = "India (IST)";

/// Name of the zone the local badge is actually formatted in. Unknown ids
/// fall back to UTC, so the label does too.
pub fn zone_label(timezone_id: &str) -> &'static str {
    clock::zone(timezone_id).name()
}

pub fn card(snapshot: &WeatherSnapshot) -> String {
    format!(
        "{}\nTemperature: {}°C\nWind Speed: {} km/h",
        snapshot.location.title(),
        snapshot.temperature_celsius,
        snapshot.wind_speed_kmh,
    )
}

/// Both clock badges, one per line.
pub fn clock_badges(zone: &str, pair: &LiveClockPair) -> String {
    format!(
        "Local ({zone}): {}\n{REFERENCE_LABEL}: {}",
        pair.primary_formatted, pair.reference_formatted
    )
}

/// Both badges on a single line, for in-place redraws.
pub fn clock_line(zone: &str, pair: &LiveClockPair) -> String {
    format!(
        "Local ({zone}): {} | {REFERENCE_LABEL}: {}",
        pair.primary_formatted, pair.reference_formatted
    )
}

pub fn error_banner(err: &PipelineError) -> String {
    format!("Error: {err}")
}
