//! In-memory [`WeatherSource`] for unit tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Notify;

use crate::provider::{CurrentConditions, GeoMatch, WeatherSource};

#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Value(T),
    Fail(&'static str),
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> Result<T> {
        match self {
            Reply::Value(v) => Ok(v.clone()),
            Reply::Fail(msg) => Err(anyhow!(*msg)),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ScriptedSource {
    pub search: Reply<Option<GeoMatch>>,
    pub timezone: Reply<Option<String>>,
    pub weather: Reply<Option<CurrentConditions>>,
    /// When set, `search_city` waits for a notification before answering.
    pub search_gate: Option<Arc<Notify>>,
    pub search_calls: AtomicUsize,
    pub timezone_calls: AtomicUsize,
    pub weather_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn mumbai() -> Self {
        Self {
            search: Reply::Value(Some(GeoMatch {
                latitude: 19.07,
                longitude: 72.88,
                name: "Mumbai".into(),
                country: Some("India".into()),
                timezone: None,
            })),
            timezone: Reply::Value(Some("Asia/Kolkata".into())),
            weather: Reply::Value(Some(CurrentConditions {
                temperature: 30.5,
                windspeed: 12.3,
            })),
            search_gate: None,
            search_calls: AtomicUsize::new(0),
            timezone_calls: AtomicUsize::new(0),
            weather_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.search_calls.load(Ordering::SeqCst),
            self.timezone_calls.load(Ordering::SeqCst),
            self.weather_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn search_city(&self, _name: &str) -> Result<Option<GeoMatch>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.search_gate {
            gate.notified().await;
        }
        self.search.get()
    }

    async fn lookup_timezone(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>> {
        self.timezone_calls.fetch_add(1, Ordering::SeqCst);
        self.timezone.get()
    }

    async fn current_weather(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Option<CurrentConditions>> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        self.weather.get()
    }
}
