//! Append-only audit log.
//!
//! [`AuditLogSink`] writes one JSON line per event to
//! `<dir>/<source>.jsonl`. The source file (and its directory) is created
//! lazily the first time an entry is written. Entries carry the event
//! severity and the legacy `(category, event_id)` subtype pair so existing
//! log tooling can keep filtering on them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use thermwatch_core::alert::{NotificationEvent, Severity};
use thermwatch_core::types::Timestamp;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::sink::{NotificationSink, SinkError};

/// One line of the audit log.
#[derive(Debug, Serialize)]
pub struct AuditEntry<'a> {
    pub timestamp: Timestamp,
    pub source: &'a str,
    pub severity: Severity,
    pub category: u16,
    pub event_id: u16,
    pub kind: &'static str,
    pub value: f64,
    pub message: String,
}

impl<'a> AuditEntry<'a> {
    pub fn from_event(source: &'a str, event: &NotificationEvent, timestamp: Timestamp) -> Self {
        let code = event.audit_code();
        Self {
            timestamp,
            source,
            severity: event.severity(),
            category: code.category,
            event_id: code.event_id,
            kind: event.kind(),
            value: event.value(),
            message: event.message(),
        }
    }
}

/// Writes notification events to a per-source JSON-lines file.
pub struct AuditLogSink {
    dir: PathBuf,
    source: String,
    /// Serializes appends so concurrent dispatches never interleave lines.
    write_lock: Mutex<()>,
}

impl AuditLogSink {
    pub fn new(dir: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            source: source.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the log file for this source.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.jsonl", self.source))
    }

    /// Append one entry, creating the source on first use.
    pub async fn append(&self, entry: &AuditEntry<'_>) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let path = self.path();
        self.ensure_source(&path).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn ensure_source(&self, path: &Path) -> Result<(), SinkError> {
        if tokio::fs::try_exists(path).await? {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        tracing::info!(source = %self.source, path = %path.display(), "Audit log source created");
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for AuditLogSink {
    fn name(&self) -> &'static str {
        "audit_log"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        let entry = AuditEntry::from_event(&self.source, event, Utc::now());
        self.append(&entry).await?;
        tracing::debug!(kind = event.kind(), "Audit entry written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
