//! Fan-out of notification events to every configured sink.
//!
//! [`NotificationDispatcher`] runs all sinks for an event concurrently and
//! waits for each to finish or hit the per-sink timeout. A failing, slow or
//! panicking sink is logged and recorded in the [`DispatchReport`]; the
//! others are unaffected and the caller always gets control back.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thermwatch_core::alert::NotificationEvent;
use thermwatch_core::reading::Reading;

use crate::sink::{NotificationSink, SinkError};

/// Default upper bound for a single sink call.
pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one sink invocation.
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: &'static str,
    pub result: Result<(), SinkError>,
}

/// Per-sink results of one dispatch, in sink registration order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<SinkOutcome>,
}

impl DispatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Look up the outcome for a sink by name.
    pub fn outcome(&self, sink: &str) -> Option<&SinkOutcome> {
        self.outcomes.iter().find(|o| o.sink == sink)
    }
}

/// Invokes every registered sink for each event.
pub struct NotificationDispatcher {
    sinks: Vec<Arc<dyn NotificationSink>>,
    sink_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(sink_timeout: Duration) -> Self {
        Self {
            sinks: Vec::new(),
            sink_timeout,
        }
    }

    /// Register a sink, builder style.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn NotificationSink>) {
        tracing::debug!(sink = sink.name(), "Notification sink registered");
        self.sinks.push(sink);
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Deliver `event` to every sink.
    pub async fn dispatch(&self, event: &NotificationEvent) -> DispatchReport {
        tracing::info!(
            kind = event.kind(),
            value = event.value(),
            sinks = self.sinks.len(),
            "Dispatching notification"
        );
        let event = *event;
        self.run_all("notify", move |sink| async move { sink.notify(&event).await })
            .await
    }

    /// Tell every sink the monitor has started.
    pub async fn announce_startup(&self) -> DispatchReport {
        self.run_all("announce_startup", |sink| async move {
            sink.announce_startup().await
        })
        .await
    }

    /// Forward a reading to every sink's `observe` hook.
    pub fn observe(&self, reading: &Reading) {
        for sink in &self.sinks {
            sink.observe(reading);
        }
    }

    /// Run `call` for every sink on its own task.
    ///
    /// A panicking sink only fails its own outcome. A sink still running at
    /// the timeout is aborted.
    async fn run_all<F, Fut>(&self, op: &'static str, call: F) -> DispatchReport
    where
        F: Fn(Arc<dyn NotificationSink>) -> Fut,
        Fut: Future<Output = Result<(), SinkError>> + Send + 'static,
    {
        let timeout = self.sink_timeout;

        let tasks = self.sinks.iter().map(|sink| {
            let name = sink.name();
            let mut handle = tokio::spawn(call(Arc::clone(sink)));
            async move {
                let result = match tokio::time::timeout(timeout, &mut handle).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => Err(SinkError::Panicked(join_err.to_string())),
                    Err(_) => {
                        handle.abort();
                        Err(SinkError::Timeout(timeout))
                    }
                };
                if let Err(e) = &result {
                    tracing::error!(sink = name, op, error = %e, "Notification sink failed");
                }
                SinkOutcome { sink: name, result }
            }
        });

        DispatchReport {
            outcomes: join_all(tasks).await,
        }
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SINK_TIMEOUT)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
