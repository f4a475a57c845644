//! Sensor access.
//!
//! A [`HardwareProvider`] enumerates every sensor it can see as a flat list
//! of `identifier → value` pairs. [`ProviderSensorSource`] resolves the one
//! configured identifier on each call and turns every failure into an
//! unavailable [`Reading`] instead of an error.

pub mod hwmon;
pub mod nvml;

use std::sync::Arc;

use chrono::Utc;
use thermwatch_core::reading::Reading;

pub use hwmon::HwmonProvider;
pub use nvml::NvmlProvider;

/// One sensor as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorEntry {
    /// Stable identifier, e.g. `/gpu-nvidia/0/temperature/0`.
    pub identifier: String,
    /// Current value in degrees, `None` when the sensor has no reading.
    pub value: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("NVML error: {0}")]
    Nvml(#[from] nvml_wrapper::error::NvmlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hardware provider unavailable: {0}")]
    Unavailable(String),
}

/// Refreshes and lists the sensors of some measurement backend.
pub trait HardwareProvider: Send + Sync {
    fn enumerate(&self) -> Result<Vec<SensorEntry>, ProviderError>;
}

impl<P: HardwareProvider + ?Sized> HardwareProvider for Box<P> {
    fn enumerate(&self) -> Result<Vec<SensorEntry>, ProviderError> {
        (**self).enumerate()
    }
}

impl<P: HardwareProvider + ?Sized> HardwareProvider for Arc<P> {
    fn enumerate(&self) -> Result<Vec<SensorEntry>, ProviderError> {
        (**self).enumerate()
    }
}

/// Produces one reading per call. Never fails; failures are unavailable
/// readings.
pub trait SensorSource: Send + Sync {
    fn read(&self) -> Reading;
}

/// Resolves a configured identifier against a provider.
pub struct ProviderSensorSource<P> {
    provider: P,
    identifier: String,
}

impl<P: HardwareProvider> ProviderSensorSource<P> {
    pub fn new(provider: P, identifier: impl Into<String>) -> Self {
        Self {
            provider,
            identifier: identifier.into(),
        }
    }

    /// Check the configured identifier against the provider and log every
    /// known identifier when it is missing. Returns whether it was found.
    pub fn verify_identifier(&self) -> bool {
        let entries = match self.provider.enumerate() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Sensor enumeration failed");
                return false;
            }
        };
        if entries.iter().any(|s| s.identifier == self.identifier) {
            return true;
        }
        tracing::warn!(
            identifier = %self.identifier,
            "Configured sensor not found; available sensors follow"
        );
        for entry in &entries {
            tracing::info!(identifier = %entry.identifier, value = ?entry.value, "Available sensor");
        }
        false
    }
}

impl<P: HardwareProvider> SensorSource for ProviderSensorSource<P> {
    fn read(&self) -> Reading {
        let now = Utc::now();
        let entries = match self.provider.enumerate() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Sensor read failed");
                return Reading::unavailable(now);
            }
        };

        match entries.into_iter().find(|s| s.identifier == self.identifier) {
            Some(SensorEntry {
                value: Some(value), ..
            }) => Reading::new(value, now),
            Some(_) => {
                tracing::warn!(identifier = %self.identifier, "Sensor reported no value");
                Reading::unavailable(now)
            }
            None => {
                tracing::warn!(identifier = %self.identifier, "Sensor not found");
                Reading::unavailable(now)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
