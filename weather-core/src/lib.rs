//! Core library for the `weather-now` CLI.
//!
//! This crate defines:
//! - Configuration handling (service endpoints, timeouts)
//! - The remote lookup seam and its Open-Meteo implementation
//! - Location resolution with timezone fallback, current-weather fetching
//! - The live dual clock and the orchestrator that sequences a lookup
//!
//! It is used by `weather-cli`, but any front end can drive an
//! [`Orchestrator`] and render the [`AppState`] it publishes.

pub mod clock;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::PipelineError;
pub use model::{LiveClockPair, LocationQuery, ResolvedLocation, WeatherSnapshot};
pub use pipeline::{Action, AppState, Orchestrator, RequestStatus, SubmitOutcome};
pub use provider::{OpenMeteoProvider, WeatherSource};
