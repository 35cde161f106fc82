//! GPU utilization probes.

use anyhow::Result;

/// Reads GPU utilization for the monitor.
///
/// Kept separate from [`MetricSource`](crate::MetricSource) because GPU
/// sampling needs a vendor library that many deployments do not ship.
pub trait GpuProbe: Send + Sync {
    /// Current GPU core utilization as a fraction in [0, 1].
    fn utilization_fraction(&self) -> Result<f64>;
}

#[cfg(feature = "nvml")]
mod nvml_probe {
    use super::GpuProbe;
    use anyhow::{Context, Result};
    use nvml_wrapper::Nvml;

    /// NVML-backed probe over GPU device 0.
    pub struct NvmlProbe {
        // Holds exclusive ownership of NVML
        nvml: Nvml,
    }

    impl NvmlProbe {
        /// Initialise NVML. Fails on machines without an NVIDIA driver.
        pub fn new() -> Result<Self> {
            let nvml = Nvml::init().context("NVML initialization failed")?;
            Ok(Self { nvml })
        }
    }

    impl GpuProbe for NvmlProbe {
        fn utilization_fraction(&self) -> Result<f64> {
            let device = self
                .nvml
                .device_by_index(0)
                .context("Failed to access GPU device 0")?;
            let rates = device
                .utilization_rates()
                .context("Failed to get core utilization")?;
            Ok(f64::from(rates.gpu) / 100.0)
        }
    }
}

#[cfg(feature = "nvml")]
pub use nvml_probe::NvmlProbe;
