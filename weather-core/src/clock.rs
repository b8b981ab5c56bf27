//! Live dual clock: the resolved location's local time next to the
//! reference zone, refreshed once per second.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, warn};

use crate::model::LiveClockPair;

/// Zone shown on the second badge.
pub const REFERENCE_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// en-IN abbreviates September as "Sept"; chrono's `%b` would give "Sep".
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

/// Parse an IANA zone name; unknown names format as UTC.
pub fn zone(timezone_id: &str) -> Tz {
    timezone_id.parse::<Tz>().unwrap_or_else(|_| {
        warn!(timezone_id, "Unknown timezone, formatting clock in UTC");
        Tz::UTC
    })
}

/// en-IN medium date and time, e.g. "15 Jan 2024, 12:00:00 pm".
pub fn format_in(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    format!(
        "{} {} {}, {}",
        local.day(),
        MONTHS[local.month0() as usize],
        local.year(),
        local.format("%-I:%M:%S %P")
    )
}

/// Format one instant for both badges.
pub fn clock_pair_at(instant: DateTime<Utc>, primary: Tz) -> LiveClockPair {
    LiveClockPair {
        primary_formatted: format_in(instant, primary),
        reference_formatted: format_in(instant, REFERENCE_TIMEZONE),
    }
}

/// Owns a running ticker task. Cancelling or dropping the handle stops it.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn cancel(self) {
        // Drop does the work.
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a task that calls `on_tick` immediately and then every
/// [`TICK_PERIOD`], each time with a freshly sampled instant.
///
/// Must be called from within a tokio runtime.
pub fn start<F>(timezone_id: &str, on_tick: F) -> TickerHandle
where
    F: Fn(LiveClockPair) + Send + 'static,
{
    let tz = zone(timezone_id);
    debug!(timezone = tz.name(), "Starting clock ticker");

    let task = tokio::spawn(async move {
        let mut ticker = interval(TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            on_tick(clock_pair_at(Utc::now(), tz));
        }
    });

    TickerHandle { task }
}
