//! Static monitor configuration.
//!
//! [`Config`] is read once from a JSON setting file that lives next to the
//! executable (or at the path in `THERMWATCH_CONFIG`) and stays immutable
//! for the lifetime of the process. A missing or malformed file is a fatal
//! startup error.
//!
//! The original PascalCase keys (`SensorPath`, `LINENotifyToken`, ...) are
//! accepted as aliases for the snake_case names.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::CoreError;
use crate::monitor::ThresholdConfig;

/// Environment variable overriding the setting file location.
pub const CONFIG_PATH_ENV: &str = "THERMWATCH_CONFIG";

/// File name looked up next to the executable.
pub const DEFAULT_CONFIG_FILE: &str = "Setting.json";

/// Default remote push endpoint.
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://notify-api.line.me/api/notify";

/// Default audit log source identifier.
pub const DEFAULT_AUDIT_SOURCE: &str = "GPUTemperatureMonitoring";

const DEFAULT_SINK_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_HWMON_ROOT: &str = "/sys/class/hwmon";
const DEFAULT_AUDIT_DIR: &str = "logs";

/// Which hardware provider backs the sensor source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// NVIDIA Management Library.
    #[default]
    Nvml,
    /// Linux `/sys/class/hwmon` temperature inputs.
    Hwmon,
}

/// The monitor setting file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Identifier of the sensor to watch, e.g. `/gpu-nvidia/0/temperature/0`.
    #[serde(alias = "SensorPath")]
    pub sensor_identifier: String,

    /// Bearer token for the remote push endpoint. Empty disables the sink.
    #[serde(alias = "LINENotifyToken", default)]
    pub remote_token: String,

    #[serde(alias = "MonitoringIntervalMS")]
    pub poll_interval_ms: u64,

    #[serde(alias = "TemperatureThreshold")]
    pub threshold_degrees: i32,

    #[serde(alias = "FailedNotifyIntervalS")]
    pub repeat_notify_interval_seconds: u64,

    #[serde(default)]
    pub provider: ProviderKind,

    #[serde(default = "default_push_endpoint")]
    pub push_endpoint: String,

    /// Directory for the audit log. Relative paths resolve against the
    /// directory holding the setting file.
    #[serde(default)]
    pub audit_log_dir: Option<PathBuf>,

    #[serde(default = "default_audit_source")]
    pub audit_source: String,

    /// Upper bound for a single sink call.
    #[serde(default = "default_sink_timeout_ms")]
    pub sink_timeout_ms: u64,

    #[serde(default = "default_hwmon_root")]
    pub hwmon_root: PathBuf,
}

fn default_push_endpoint() -> String {
    DEFAULT_PUSH_ENDPOINT.to_string()
}

fn default_audit_source() -> String {
    DEFAULT_AUDIT_SOURCE.to_string()
}

fn default_sink_timeout_ms() -> u64 {
    DEFAULT_SINK_TIMEOUT_MS
}

fn default_hwmon_root() -> PathBuf {
    PathBuf::from(DEFAULT_HWMON_ROOT)
}

impl Config {
    /// Resolve the setting file path.
    ///
    /// `THERMWATCH_CONFIG` wins; otherwise `Setting.json` in the directory
    /// of the running executable.
    pub fn default_path() -> Result<PathBuf, CoreError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let exe = std::env::current_exe()
            .map_err(|e| CoreError::Internal(format!("cannot locate executable: {e}")))?;
        let dir = exe
            .parent()
            .ok_or_else(|| CoreError::Internal("executable has no parent directory".into()))?;
        Ok(dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Read, parse and validate the setting file at `path`.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse a setting document without validating it.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        // Setting files written by Windows editors often carry a BOM.
        serde_json::from_str(raw.trim_start_matches('\u{feff}'))
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.sensor_identifier.trim().is_empty() {
            return Err(CoreError::Validation(
                "sensor_identifier must not be empty".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(CoreError::Validation(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        if self.sink_timeout_ms == 0 {
            return Err(CoreError::Validation(
                "sink_timeout_ms must be at least 1".into(),
            ));
        }
        if self.push_endpoint.trim().is_empty() {
            return Err(CoreError::Validation(
                "push_endpoint must not be empty".into(),
            ));
        }
        if self.audit_source.trim().is_empty() {
            return Err(CoreError::Validation(
                "audit_source must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn repeat_notify_interval(&self) -> Duration {
        Duration::from_secs(self.repeat_notify_interval_seconds)
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_millis(self.sink_timeout_ms)
    }

    /// Whether the remote push sink should be constructed.
    pub fn remote_push_enabled(&self) -> bool {
        !self.remote_token.trim().is_empty()
    }

    /// Audit log directory, resolved against `base` when relative.
    pub fn audit_log_dir_in(&self, base: &Path) -> PathBuf {
        let dir = self
            .audit_log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_DIR));
        if dir.is_absolute() {
            dir
        } else {
            base.join(dir)
        }
    }

    /// The slice of configuration the state machine needs.
    pub fn threshold_config(&self) -> ThresholdConfig {
        ThresholdConfig {
            threshold: f64::from(self.threshold_degrees),
            repeat_notify_interval: self.repeat_notify_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;

    use super::*;

    const SNAKE_CASE: &str = r#"{
        "sensor_identifier": "/gpu-nvidia/0/temperature/0",
        "remote_token": "secret",
        "poll_interval_ms": 5000,
        "threshold_degrees": 80,
        "repeat_notify_interval_seconds": 60
    }"#;

    #[test]
    fn parses_snake_case_keys_with_defaults() {
        let config = Config::from_json(SNAKE_CASE).unwrap();
        assert_eq!(config.sensor_identifier, "/gpu-nvidia/0/temperature/0");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.repeat_notify_interval(), Duration::from_secs(60));
        assert_eq!(config.provider, ProviderKind::Nvml);
        assert_eq!(config.push_endpoint, DEFAULT_PUSH_ENDPOINT);
        assert_eq!(config.audit_source, DEFAULT_AUDIT_SOURCE);
        assert_eq!(config.sink_timeout(), Duration::from_secs(10));
        assert!(config.remote_push_enabled());
    }

    #[test]
    fn accepts_legacy_pascal_case_keys() {
        let raw = "\u{feff}{
            \"SensorPath\": \"/gpu-nvidia/0/temperature/0\",
            \"LINENotifyToken\": \"abc\",
            \"MonitoringIntervalMS\": 1000,
            \"TemperatureThreshold\": 75,
            \"FailedNotifyIntervalS\": 30
        }";
        let config = Config::from_json(raw).unwrap();
        assert_eq!(config.remote_token, "abc");
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.threshold_degrees, 75);
        assert_eq!(config.repeat_notify_interval_seconds, 30);
    }

    #[test]
    fn threshold_config_projects_fields() {
        let config = Config::from_json(SNAKE_CASE).unwrap();
        let tc = config.threshold_config();
        assert_eq!(tc.threshold, 80.0);
        assert_eq!(tc.repeat_notify_interval, Duration::from_secs(60));
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let raw = r#"{ "sensor_identifier": "x", "poll_interval_ms": 1 }"#;
        assert!(Config::from_json(raw).is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut config = Config::from_json(SNAKE_CASE).unwrap();
        config.poll_interval_ms = 0;
        assert_matches!(config.validate(), Err(CoreError::Validation(msg)) if msg.contains("poll_interval_ms"));
    }

    #[test]
    fn rejects_blank_sensor_identifier() {
        let mut config = Config::from_json(SNAKE_CASE).unwrap();
        config.sensor_identifier = "  ".into();
        assert_matches!(config.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_token_disables_remote_push() {
        let mut config = Config::from_json(SNAKE_CASE).unwrap();
        config.remote_token = String::new();
        assert!(!config.remote_push_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn audit_dir_resolves_relative_to_base() {
        let mut config = Config::from_json(SNAKE_CASE).unwrap();
        let base = Path::new("/opt/thermwatch");
        assert_eq!(config.audit_log_dir_in(base), base.join("logs"));

        config.audit_log_dir = Some(PathBuf::from("/var/log/thermwatch"));
        assert_eq!(
            config.audit_log_dir_in(base),
            PathBuf::from("/var/log/thermwatch")
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Setting.json");
        assert_matches!(Config::load(&path), Err(CoreError::ConfigRead { .. }));
    }

    #[test]
    fn load_reports_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert_matches!(Config::load(file.path()), Err(CoreError::ConfigParse { .. }));
    }

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAKE_CASE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.threshold_degrees, 80);
    }
}
