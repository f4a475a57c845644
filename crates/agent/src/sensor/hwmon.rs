//! Linux hwmon temperature provider.
//!
//! Reads `temp<N>_input` files (millidegrees Celsius) under every
//! `/sys/class/hwmon/hwmon*` directory. Identifiers use the chip name from
//! the `name` file rather than the hwmon index, which the kernel does not
//! keep stable across boots: `/hwmon/<chip>/temperature/<N>`. A chip name
//! seen more than once gets a `#<k>` suffix in enumeration order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{HardwareProvider, ProviderError, SensorEntry};

const MILLIDEGREES_PER_DEGREE: f64 = 1000.0;

pub struct HwmonProvider {
    root: PathBuf,
}

impl HwmonProvider {
    /// Open the hwmon class directory. Fails if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ProviderError::Unavailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    fn chip_dirs(&self) -> Result<Vec<PathBuf>, ProviderError> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}

fn chip_name(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("name"))
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string())
        })
}

/// Sensor index from a `temp<N>_input` file name.
fn temp_index(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("temp")?
        .strip_suffix("_input")?
        .parse()
        .ok()
}

fn read_millidegrees(path: &Path) -> Option<f64> {
    let raw = std::fs::read_to_string(path).ok()?;
    let milli: i64 = raw.trim().parse().ok()?;
    Some(milli as f64 / MILLIDEGREES_PER_DEGREE)
}

impl HardwareProvider for HwmonProvider {
    fn enumerate(&self) -> Result<Vec<SensorEntry>, ProviderError> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut sensors = Vec::new();

        for dir in self.chip_dirs()? {
            let base = chip_name(&dir);
            let occurrence = seen.entry(base.clone()).or_insert(0);
            let chip = if *occurrence == 0 {
                base
            } else {
                format!("{base}#{occurrence}")
            };
            *occurrence += 1;

            let mut inputs: Vec<(u32, PathBuf)> = match std::fs::read_dir(&dir) {
                Ok(entries) => entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| {
                        let idx = temp_index(&e.file_name().to_string_lossy())?;
                        Some((idx, e.path()))
                    })
                    .collect(),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable hwmon chip");
                    continue;
                }
            };
            inputs.sort();

            for (idx, path) in inputs {
                sensors.push(SensorEntry {
                    identifier: format!("/hwmon/{chip}/temperature/{idx}"),
                    value: read_millidegrees(&path),
                });
            }
        }

        Ok(sensors)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
