use thiserror::Error;

/// Reasons a lookup run can end without a weather snapshot.
///
/// `Display` yields the message shown to the user. Transport diagnostics for
/// [`PipelineError::NetworkFailure`] are kept in `detail` and only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Please enter a city name")]
    EmptyInput,

    #[error("City not found. Try another city.")]
    NotFound,

    #[error("Weather data unavailable for this location.")]
    DataUnavailable,

    #[error("Something went wrong. Please try again.")]
    NetworkFailure { detail: String },
}

impl PipelineError {
    /// Wrap a transport, status or parse failure from a provider call.
    pub fn network(err: anyhow::Error) -> Self {
        PipelineError::NetworkFailure {
            detail: format!("{err:#}"),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::EmptyInput => "empty_input",
            PipelineError::NotFound => "not_found",
            PipelineError::DataUnavailable => "data_unavailable",
            PipelineError::NetworkFailure { .. } => "network_failure",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            PipelineError::NetworkFailure { detail } => Some(detail.as_str()),
            _ => None,
        }
    }
}
