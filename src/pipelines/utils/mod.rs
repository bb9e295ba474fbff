use super::cache::ModelOptions;
use crate::error::{PipelineError, Result};
use candle_core::backend::BackendDevice;
use candle_core::{CudaDevice, Device};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

// One CudaDevice per ordinal: cached models keep using the stream they were loaded on.
static CUDA_DEVICES: Lazy<Mutex<HashMap<usize, CudaDevice>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Where inference runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    /// Host CPU (default).
    #[default]
    Cpu,
    /// CUDA GPU by ordinal. Requires the `cuda` feature.
    Cuda(usize),
}

impl DeviceRequest {
    /// Initialize the requested device.
    ///
    /// CUDA devices are created once per ordinal and synchronized before every reuse, so
    /// pipelines sharing a cached model also share its stream.
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => {
                let mut devices = CUDA_DEVICES.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(dev) = devices.get(&i) {
                    dev.synchronize().map_err(|e| {
                        PipelineError::Device(format!("Failed to sync CUDA device {i}: {e}"))
                    })?;
                    return Ok(Device::Cuda(dev.clone()));
                }

                let dev = CudaDevice::new_with_stream(i).map_err(|e| {
                    PipelineError::Device(format!(
                        "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                    ))
                })?;
                tracing::debug!(ordinal = i, "initialized cuda device");
                devices.insert(i, dev.clone());
                Ok(Device::Cuda(dev))
            }
        }
    }
}

pub fn build_cache_key<O: ModelOptions>(options: &O, device: &Device) -> String {
    format!("{}-{:?}", options.cache_key(), device.location())
}
