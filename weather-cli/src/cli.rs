use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Text};
use std::{
    io::{self, Write},
    sync::Arc,
};
use tokio::sync::watch;
use tracing::debug;
use weather_core::{
    AppState, Config, LiveClockPair, OpenMeteoProvider, Orchestrator, RequestStatus,
    SubmitOutcome,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-now", version, about = "Current weather and live local time for a city")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the geocoding service base URL for this run.
    #[arg(long, global = true)]
    pub geocoding_url: Option<String>,

    /// Override the forecast/timezone service base URL for this run.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather and local time for a city.
    Show {
        /// City name, e.g. "Mumbai".
        city: String,

        /// Keep the clocks updating every second until Ctrl-C.
        #[arg(long, conflicts_with = "json")]
        live: bool,

        /// Print the weather snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Look up cities one after another from a prompt.
    Interactive,

    /// Edit service endpoints and request timeout.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match &self.command {
            Command::Configure => configure(),
            Command::Show { city, live, json } => {
                let orch = self.orchestrator()?;
                let result = show(&orch, city, *live, *json).await;
                orch.shutdown().await;
                result
            }
            Command::Interactive => {
                let orch = self.orchestrator()?;
                let result = interactive(&orch).await;
                orch.shutdown().await;
                result
            }
        }
    }

    fn config(&self) -> Result<Config> {
        let mut cfg = Config::load()?;

        if let Some(url) = &self.geocoding_url {
            cfg.geocoding_base_url = url.clone();
        }
        if let Some(url) = &self.api_url {
            cfg.api_base_url = url.clone();
        }

        cfg.validate().context("Invalid endpoint override")?;
        Ok(cfg)
    }

    fn orchestrator(&self) -> Result<Orchestrator> {
        let provider = OpenMeteoProvider::new(&self.config()?)?;
        Ok(Orchestrator::new(Arc::new(provider)))
    }
}

async fn show(orch: &Orchestrator, city: &str, live: bool, json: bool) -> Result<()> {
    let mut rx = orch.subscribe();

    let snapshot = match orch.lookup(city).await {
        SubmitOutcome::Completed(Ok(snapshot)) => snapshot,
        SubmitOutcome::Completed(Err(err)) => return Err(err.into()),
        SubmitOutcome::Ignored => return Ok(()),
    };

    if json {
        let out = serde_json::to_string_pretty(&snapshot)
            .context("Failed to serialize weather snapshot")?;
        println!("{out}");
        return Ok(());
    }

    let zone = render::zone_label(&snapshot.location.timezone_id);
    println!("{}", render::card(&snapshot));

    if !live {
        if let Some(pair) = next_clock(&mut rx).await {
            println!("{}", render::clock_badges(zone, &pair));
        }
        return Ok(());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            pair = next_clock(&mut rx) => {
                let Some(pair) = pair else { break };
                print!("\r{}", render::clock_line(zone, &pair));
                io::stdout().flush().context("Failed to write to stdout")?;
            }
            res = &mut ctrl_c => {
                res.context("Failed to listen for Ctrl-C")?;
                println!();
                break;
            }
        }
    }

    Ok(())
}

/// What to do with one answer from the city prompt.
#[derive(Debug, PartialEq, Eq)]
enum Prompted {
    Lookup(String),
    Quit,
}

fn prompted(answer: Result<String, InquireError>) -> Result<Prompted> {
    match answer {
        Ok(city) if city.trim().is_empty() => Ok(Prompted::Quit),
        Ok(city) => Ok(Prompted::Lookup(city)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Ok(Prompted::Quit)
        }
        Err(e) => Err(e).context("Failed to read city"),
    }
}

async fn interactive(orch: &Orchestrator) -> Result<()> {
    println!("Enter a city name to look up. Submit an empty line or press Esc to quit.");
    let mut rx = orch.subscribe();

    loop {
        let answer = tokio::task::spawn_blocking(|| {
            Text::new("City:").with_placeholder("e.g. Mumbai").prompt()
        })
        .await
        .context("Prompt task failed")?;

        let Prompted::Lookup(city) = prompted(answer)? else {
            debug!("Leaving interactive mode");
            break;
        };

        match orch.lookup(city).await {
            SubmitOutcome::Completed(Ok(snapshot)) => {
                println!("{}", render::card(&snapshot));
                let zone = render::zone_label(&snapshot.location.timezone_id);
                if let Some(pair) = next_clock(&mut rx).await {
                    println!("{}", render::clock_badges(zone, &pair));
                }
            }
            SubmitOutcome::Completed(Err(err)) => eprintln!("{}", render::error_banner(&err)),
            SubmitOutcome::Ignored => debug!("Lookup still running, answer ignored"),
        }
    }

    Ok(())
}

/// Wait for a state change and return the clock pair it carries.
///
/// Returns `None` once the state leaves `Success` or the orchestrator is gone.
async fn next_clock(rx: &mut watch::Receiver<AppState>) -> Option<LiveClockPair> {
    loop {
        rx.changed().await.ok()?;
        let state = rx.borrow_and_update();
        if state.status != RequestStatus::Success {
            return None;
        }
        if let Some(pair) = &state.live_clock {
            return Some(pair.clone());
        }
    }
}

fn configure() -> Result<()> {
    let current = Config::load()?;

    let geocoding_base_url = Text::new("Geocoding base URL:")
        .with_initial_value(&current.geocoding_base_url)
        .prompt()
        .context("Failed to read geocoding base URL")?;

    let api_base_url = Text::new("Forecast/timezone base URL:")
        .with_initial_value(&current.api_base_url)
        .prompt()
        .context("Failed to read forecast base URL")?;

    let request_timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(current.request_timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read request timeout")?;

    let cfg = Config {
        geocoding_base_url,
        api_base_url,
        request_timeout_secs,
    };
    cfg.save()?;

    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
