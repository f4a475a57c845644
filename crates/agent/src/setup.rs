//! Startup wiring: provider selection and sink registration.
//!
//! Everything here runs once before the poller starts; any error is a
//! fatal startup failure for the binary.

use std::path::Path;
use std::sync::Arc;

use thermwatch_core::config::{Config, ProviderKind};
use thermwatch_events::{
    AuditLogSink, LocalAlertSink, LogPresenter, NotificationDispatcher, RemotePushSink, SinkError,
    StatusIndicator,
};

use crate::sensor::{HardwareProvider, HwmonProvider, NvmlProvider, ProviderError};

/// Open the hardware provider named in the config.
pub fn open_provider(config: &Config) -> Result<Box<dyn HardwareProvider>, ProviderError> {
    match config.provider {
        ProviderKind::Nvml => Ok(Box::new(NvmlProvider::open()?)),
        ProviderKind::Hwmon => Ok(Box::new(HwmonProvider::open(config.hwmon_root.clone())?)),
    }
}

/// Build the dispatcher with every sink the config enables.
///
/// `config_dir` anchors a relative audit log directory. The remote push
/// sink is skipped when no token is configured.
pub fn build_dispatcher(
    config: &Config,
    config_dir: &Path,
    indicator: Arc<StatusIndicator>,
) -> Result<NotificationDispatcher, SinkError> {
    let mut dispatcher = NotificationDispatcher::new(config.sink_timeout());

    dispatcher.add_sink(Arc::new(LocalAlertSink::new(
        indicator,
        Arc::new(LogPresenter),
    )));

    dispatcher.add_sink(Arc::new(AuditLogSink::new(
        config.audit_log_dir_in(config_dir),
        config.audit_source.clone(),
    )));

    if config.remote_push_enabled() {
        dispatcher.add_sink(Arc::new(RemotePushSink::new(
            config.push_endpoint.clone(),
            config.remote_token.clone(),
        )?));
    } else {
        tracing::warn!("remote_token is empty, remote push disabled");
    }

    Ok(dispatcher)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
