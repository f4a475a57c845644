//! `thermwatch-agent` -- GPU temperature threshold monitor.
//!
//! Polls one temperature sensor at a fixed interval and notifies the
//! status indicator, the audit log and (optionally) a remote push endpoint
//! when the reading crosses the configured threshold, repeating the alert
//! at a bounded rate while it persists.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default                    | Description                    |
//! |----------------------|----------|----------------------------|--------------------------------|
//! | `THERMWATCH_CONFIG`  | no       | `Setting.json` next to exe | Path of the setting file       |
//! | `RUST_LOG`           | no       | `thermwatch_agent=info,...`| Log filter                     |

use std::path::Path;
use std::sync::Arc;

use thermwatch_agent::poller::Poller;
use thermwatch_agent::sensor::ProviderSensorSource;
use thermwatch_agent::setup;
use thermwatch_core::config::Config;
use thermwatch_events::StatusIndicator;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "thermwatch_agent=info,thermwatch_events=info,thermwatch_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = Config::default_path().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Cannot resolve setting file path");
        std::process::exit(1);
    });

    let config = Config::load(&config_path).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        std::process::exit(1);
    });

    tracing::info!(
        config = %config_path.display(),
        sensor = %config.sensor_identifier,
        provider = ?config.provider,
        threshold = config.threshold_degrees,
        interval_ms = config.poll_interval_ms,
        repeat_secs = config.repeat_notify_interval_seconds,
        "Starting thermwatch-agent",
    );

    let provider = setup::open_provider(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to open hardware provider");
        std::process::exit(1);
    });

    let sensor = ProviderSensorSource::new(provider, config.sensor_identifier.clone());
    sensor.verify_identifier();

    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let indicator = Arc::new(StatusIndicator::new());
    let dispatcher = setup::build_dispatcher(&config, config_dir, indicator)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to set up notification sinks");
            std::process::exit(1);
        });

    let poller = Poller::new(
        sensor,
        Arc::new(dispatcher),
        config.threshold_config(),
        config.poll_interval(),
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            cancel.cancel();
        });
    }

    poller.start().await;
    poller.run(cancel).await;

    tracing::info!("Shutdown complete");
}

/// Wait for a termination signal.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the monitor stops
/// cleanly whether quit interactively or by a service manager. A handler
/// that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
