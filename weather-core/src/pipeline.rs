//! Request orchestration: sequences resolve → fetch → clock over an explicit
//! state reducer and owns the single live ticker.

use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use crate::{
    clock::{self, TickerHandle},
    error::PipelineError,
    fetcher,
    model::{LiveClockPair, WeatherSnapshot},
    provider::WeatherSource,
    resolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// Everything a front end needs to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub city: String,
    pub status: RequestStatus,
    pub snapshot: Option<WeatherSnapshot>,
    pub error: Option<PipelineError>,
    pub live_clock: Option<LiveClockPair>,
    /// Id of the most recently started run.
    pub run: u64,
}

#[derive(Debug, Clone)]
pub enum Action {
    SetCity(String),
    /// Start a new run; ignored while one is loading.
    Begin,
    Succeeded { run: u64, snapshot: WeatherSnapshot },
    Failed { run: u64, error: PipelineError },
    Tick { run: u64, pair: LiveClockPair },
    Teardown,
}

impl AppState {
    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Loading
    }

    /// Apply one transition. Returns whether anything changed.
    ///
    /// Results and ticks tagged with a run other than the current one are
    /// dropped, so a late ticker can never overwrite a newer run.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::SetCity(city) => {
                if self.city == city {
                    return false;
                }
                self.city = city;
                true
            }
            Action::Begin => {
                if self.is_loading() {
                    return false;
                }
                self.run += 1;
                self.status = RequestStatus::Loading;
                self.error = None;
                self.snapshot = None;
                self.live_clock = None;
                true
            }
            Action::Succeeded { run, snapshot } => {
                if run != self.run || !self.is_loading() {
                    return false;
                }
                self.status = RequestStatus::Success;
                self.snapshot = Some(snapshot);
                true
            }
            Action::Failed { run, error } => {
                if run != self.run || !self.is_loading() {
                    return false;
                }
                self.status = RequestStatus::Failed;
                self.error = Some(error);
                self.snapshot = None;
                self.live_clock = None;
                true
            }
            Action::Tick { run, pair } => {
                if run != self.run || self.status != RequestStatus::Success {
                    return false;
                }
                if self.live_clock.as_ref() == Some(&pair) {
                    return false;
                }
                self.live_clock = Some(pair);
                true
            }
            Action::Teardown => {
                let changed = self.status != RequestStatus::Idle
                    || self.snapshot.is_some()
                    || self.error.is_some()
                    || self.live_clock.is_some();
                // Bumping the run invalidates anything still in flight.
                self.run += 1;
                self.status = RequestStatus::Idle;
                self.snapshot = None;
                self.error = None;
                self.live_clock = None;
                changed
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A run was already loading; nothing was started.
    Ignored,
    Completed(Result<WeatherSnapshot, PipelineError>),
}

/// Drives lookups and publishes [`AppState`] to subscribers.
#[derive(Debug)]
pub struct Orchestrator {
    source: Arc<dyn WeatherSource>,
    state: Arc<watch::Sender<AppState>>,
    ticker: Mutex<Option<TickerHandle>>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            source,
            state: Arc::new(state),
            ticker: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    fn dispatch(&self, action: Action) -> bool {
        self.state.send_if_modified(|state| state.apply(action))
    }

    pub fn set_city(&self, city: impl Into<String>) {
        self.dispatch(Action::SetCity(city.into()));
    }

    /// Set the input text and submit it.
    pub async fn lookup(&self, city: impl Into<String>) -> SubmitOutcome {
        self.set_city(city);
        self.submit().await
    }

    /// Run the pipeline for the current input text.
    ///
    /// While a run is loading further calls return [`SubmitOutcome::Ignored`].
    pub async fn submit(&self) -> SubmitOutcome {
        let mut begun = None;
        self.state.send_if_modified(|state| {
            let started = state.apply(Action::Begin);
            if started {
                begun = Some((state.run, state.city.clone()));
            }
            started
        });

        let Some((run, city)) = begun else {
            info!("Lookup already in progress, ignoring submit");
            return SubmitOutcome::Ignored;
        };

        self.stop_ticker().await;
        info!(run, city = %city, "Starting weather lookup");

        match self.run_pipeline(&city).await {
            Ok(snapshot) => {
                let accepted = self.dispatch(Action::Succeeded {
                    run,
                    snapshot: snapshot.clone(),
                });
                if accepted {
                    self.start_ticker(run, &snapshot.location.timezone_id).await;
                }
                SubmitOutcome::Completed(Ok(snapshot))
            }
            Err(error) => {
                warn!(run, kind = error.kind(), detail = error.detail(), "Weather lookup failed");
                self.dispatch(Action::Failed {
                    run,
                    error: error.clone(),
                });
                SubmitOutcome::Completed(Err(error))
            }
        }
    }

    async fn run_pipeline(&self, city: &str) -> Result<WeatherSnapshot, PipelineError> {
        let location = resolver::resolve(self.source.as_ref(), city).await?;
        fetcher::fetch_current(self.source.as_ref(), &location).await
    }

    async fn start_ticker(&self, run: u64, timezone_id: &str) {
        let state = Arc::clone(&self.state);
        let handle = clock::start(timezone_id, move |pair| {
            state.send_if_modified(|s| s.apply(Action::Tick { run, pair }));
        });

        let mut slot = self.ticker.lock().await;
        // Still the current run? Otherwise drop the new ticker right away.
        if self.state.borrow().run == run {
            *slot = Some(handle);
        }
    }

    async fn stop_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.cancel();
        }
    }

    /// Whether a clock ticker is currently alive.
    pub async fn ticker_active(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(TickerHandle::is_running)
    }

    /// Tear down: stop the ticker and return to Idle. Any run still loading
    /// will have its result discarded.
    pub async fn shutdown(&self) {
        self.stop_ticker().await;
        self.dispatch(Action::Teardown);
    }
}
