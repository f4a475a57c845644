//! Fixed-interval poll loop.
//!
//! [`Poller`] owns the [`MonitorState`]. Each tick reads the sensor,
//! evaluates the reading and commits the new state under one mutex, then
//! releases the lock and hands any event to the
//! [`NotificationDispatcher`]. Ticks never overlap: the loop awaits each tick
//! body before waiting for the next timer tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thermwatch_core::alert::NotificationEvent;
use thermwatch_core::monitor::{evaluate, MonitorState, ThresholdConfig};
use thermwatch_core::reading::Reading;
use thermwatch_core::types::Timestamp;
use thermwatch_events::{DispatchReport, NotificationDispatcher};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::sensor::SensorSource;

/// What a single tick observed and did.
#[derive(Debug)]
pub struct TickOutcome {
    pub reading: Reading,
    pub event: Option<NotificationEvent>,
    /// Present only when an event was dispatched.
    pub report: Option<DispatchReport>,
}

pub struct Poller<S> {
    sensor: S,
    dispatcher: Arc<NotificationDispatcher>,
    thresholds: ThresholdConfig,
    poll_interval: Duration,
    state: Mutex<MonitorState>,
}

/// Shortest poll interval the loop accepts.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

impl<S: SensorSource> Poller<S> {
    /// A zero `poll_interval` is raised to one millisecond.
    pub fn new(
        sensor: S,
        dispatcher: Arc<NotificationDispatcher>,
        thresholds: ThresholdConfig,
        poll_interval: Duration,
    ) -> Self {
        if poll_interval < MIN_POLL_INTERVAL {
            tracing::warn!(?poll_interval, "Poll interval too short, using 1ms");
        }
        Self {
            sensor,
            dispatcher,
            thresholds,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            state: Mutex::new(MonitorState::Normal),
        }
    }

    /// Current monitor state.
    pub async fn state(&self) -> MonitorState {
        *self.state.lock().await
    }

    /// One-time startup work: show the start banner and take a baseline
    /// reading. Neither touches the monitor state.
    pub async fn start(&self) -> Reading {
        let report = self.dispatcher.announce_startup().await;
        if !report.all_succeeded() {
            tracing::warn!(
                failed = report.failures().count(),
                "Some sinks failed to announce startup"
            );
        }

        let baseline = self.sensor.read();
        self.dispatcher.observe(&baseline);
        match baseline.value() {
            Some(value) => tracing::info!(value, "Baseline reading"),
            None => tracing::warn!("Baseline reading unavailable"),
        }
        baseline
    }

    /// Run one tick against the wall clock.
    pub async fn tick(&self) -> TickOutcome {
        self.tick_at(Utc::now()).await
    }

    /// Run one tick with an explicit evaluation time.
    ///
    /// An unavailable reading holds the current state and emits nothing.
    pub async fn tick_at(&self, now: Timestamp) -> TickOutcome {
        let (reading, event) = {
            let mut state = self.state.lock().await;
            let reading = self.sensor.read();

            let event = match reading.value() {
                Some(value) => {
                    let outcome = evaluate(value, *state, &self.thresholds, now);
                    *state = outcome.state;
                    tracing::debug!(
                        value,
                        over_threshold = state.is_over_threshold(),
                        "Tick evaluated"
                    );
                    outcome.event
                }
                None => {
                    tracing::warn!(
                        over_threshold = state.is_over_threshold(),
                        "Reading unavailable, holding state"
                    );
                    None
                }
            };
            (reading, event)
        };

        self.dispatcher.observe(&reading);

        let report = match event {
            Some(event) => Some(self.dispatcher.dispatch(&event).await),
            None => None,
        };

        TickOutcome {
            reading,
            event,
            report,
        }
    }

    /// Tick every `poll_interval` until `cancel` fires.
    ///
    /// The first tick happens one interval after the call. Cancellation
    /// during a dispatch abandons it; the state was already committed.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval = ?self.poll_interval,
            threshold = self.thresholds.threshold,
            repeat_secs = self.thresholds.repeat_notify_interval.as_secs(),
            "Poller started"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!("Abandoning in-flight tick");
                            break;
                        }
                        _ = self.tick() => {}
                    }
                }
            }
        }

        tracing::info!("Poller stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
