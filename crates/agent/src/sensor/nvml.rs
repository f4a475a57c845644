//! NVML-backed GPU temperature provider.
//!
//! [`NvmlProvider`] wraps the NVIDIA Management Library and reports the core
//! temperature of every visible GPU as `/gpu-nvidia/<index>/temperature/0`.
//! Unlike a metrics collector, the monitor cannot do anything useful
//! without the library, so [`NvmlProvider::open`] fails instead of
//! degrading to zero GPUs.

use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::Nvml;

use super::{HardwareProvider, ProviderError, SensorEntry};

/// Identifier of the core temperature sensor of GPU `index`.
pub fn gpu_temperature_identifier(index: u32) -> String {
    format!("/gpu-nvidia/{index}/temperature/0")
}

pub struct NvmlProvider {
    nvml: Nvml,
}

impl NvmlProvider {
    /// Initialise NVML.
    pub fn open() -> Result<Self, ProviderError> {
        let nvml = Nvml::init()?;
        tracing::info!("NVML initialised successfully");
        Ok(Self { nvml })
    }

    /// Number of GPUs visible to NVML.
    pub fn gpu_count(&self) -> Result<u32, ProviderError> {
        Ok(self.nvml.device_count()?)
    }

    fn read_temperature(&self, idx: u32) -> Result<u32, nvml_wrapper::error::NvmlError> {
        let device = self.nvml.device_by_index(idx)?;
        device.temperature(TemperatureSensor::Gpu)
    }
}

impl HardwareProvider for NvmlProvider {
    /// Errors on individual devices are logged and reported as a sensor
    /// without a value rather than failing the whole pass.
    fn enumerate(&self) -> Result<Vec<SensorEntry>, ProviderError> {
        let count = self.gpu_count()?;
        let mut sensors = Vec::with_capacity(count as usize);

        for idx in 0..count {
            let value = match self.read_temperature(idx) {
                Ok(celsius) => Some(f64::from(celsius)),
                Err(e) => {
                    tracing::warn!(gpu_index = idx, error = %e, "GPU temperature query failed");
                    None
                }
            };
            sensors.push(SensorEntry {
                identifier: gpu_temperature_identifier(idx),
                value,
            });
        }

        Ok(sensors)
    }
}
