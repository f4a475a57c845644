//! The sink interface shared by every notification channel.

use std::time::Duration;

use async_trait::async_trait;
use thermwatch_core::alert::NotificationEvent;
use thermwatch_core::reading::Reading;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single sink invocation.
///
/// Sink errors are reported and logged by the dispatcher; they never reach
/// the poller's state.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Remote push returned HTTP {0}")]
    HttpStatus(u16),

    /// Writing to the local filesystem failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The popup presenter refused or failed to show a popup.
    #[error("Popup presenter failed: {0}")]
    Presenter(String),

    /// The sink did not finish within the dispatcher's timeout.
    #[error("Sink timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The sink panicked while running.
    #[error("Sink panicked: {0}")]
    Panicked(String),
}

// ---------------------------------------------------------------------------
// NotificationSink
// ---------------------------------------------------------------------------

/// An external notification channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short stable name used in logs and dispatch reports.
    fn name(&self) -> &'static str;

    /// Deliver one event.
    async fn notify(&self, event: &NotificationEvent) -> Result<(), SinkError>;

    /// Called once when the monitor starts.
    async fn announce_startup(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Called with every reading, including unavailable ones.
    fn observe(&self, _reading: &Reading) {}
}
