//! Remote push delivery with short backoff retry.
//!
//! [`RemotePushSink`] POSTs `message=<text>` as a form-encoded body to a
//! messaging endpoint, authenticated with a bearer token. Only the response
//! status is interpreted. Transport errors and 5xx responses are retried
//! with a short backoff (1 s, 2 s); the dispatcher's sink timeout bounds the
//! whole call.

use std::time::Duration;

use async_trait::async_trait;
use thermwatch_core::alert::NotificationEvent;

use crate::sink::{NotificationSink, SinkError};

/// Backoff between attempts.
const RETRY_DELAYS: [Duration; 2] = [Duration::from_secs(1), Duration::from_secs(2)];

/// HTTP request timeout for a single attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pushes notification messages to a remote messaging endpoint.
pub struct RemotePushSink {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    retry_delays: Vec<Duration>,
}

impl RemotePushSink {
    /// Create a sink with a pre-configured HTTP client.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            retry_delays: RETRY_DELAYS.to_vec(),
        })
    }

    /// Override the backoff schedule. An empty schedule means one attempt.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a message, retrying on failure.
    pub async fn send(&self, message: &str) -> Result<(), SinkError> {
        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(message).await {
                Ok(()) => return Ok(()),
                Err(e) if !is_transient(&e) => {
                    tracing::error!(endpoint = %self.endpoint, error = %e, "Remote push rejected");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        endpoint = %self.endpoint,
                        error = %e,
                        "Remote push attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        self.try_send(message).await.inspect_err(|e| {
            tracing::error!(endpoint = %self.endpoint, error = %e, "Remote push failed after all retries");
        })
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, message: &str) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .form(&[("message", message)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SinkError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Transport failures and server errors are worth another attempt; a 4xx
/// means the request itself is wrong.
fn is_transient(err: &SinkError) -> bool {
    match err {
        SinkError::Http(_) => true,
        SinkError::HttpStatus(status) => *status >= 500,
        _ => false,
    }
}

#[async_trait]
impl NotificationSink for RemotePushSink {
    fn name(&self) -> &'static str {
        "remote_push"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        self.send(&event.message()).await?;
        tracing::info!(kind = event.kind(), "Remote push delivered");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
