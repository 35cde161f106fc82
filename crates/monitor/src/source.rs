//! Metric sources - the raw hardware reads behind the monitor.

use crate::gpu::GpuProbe;
use anyhow::{bail, Context, Result};
use std::sync::Mutex;
use sysinfo::{Disks, Networks, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Raw utilization reads, one method per metric.
///
/// Each read may fail independently; the monitor decides what to substitute.
/// Implementations must be cheap enough to call on every `sample()`.
pub trait MetricSource: Send + Sync {
    /// CPU utilization as a fraction in [0, 1].
    fn cpu_fraction(&self) -> Result<f64>;

    /// Memory utilization as a fraction in [0, 1].
    fn memory_fraction(&self) -> Result<f64>;

    /// Disk utilization as a fraction in [0, 1], aggregated over all disks.
    fn disk_fraction(&self) -> Result<f64>;

    /// GPU utilization as a fraction in [0, 1].
    fn gpu_fraction(&self) -> Result<f64>;

    /// Cumulative network I/O in megabytes, over all interfaces.
    fn network_io_mb(&self) -> Result<f64>;
}

/// `sysinfo`-backed metric source for the machine we run on.
///
/// GPU utilization comes from an optional [`GpuProbe`]; without one the GPU
/// read fails and the monitor substitutes its default.
pub struct SystemMetricSource {
    system: Mutex<System>,
    gpu: Option<Box<dyn GpuProbe>>,
}

impl SystemMetricSource {
    /// Create a source over the local machine.
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new_all()),
            gpu: None,
        }
    }

    /// Attach a GPU probe.
    pub fn with_gpu_probe(mut self, probe: Box<dyn GpuProbe>) -> Self {
        self.gpu = Some(probe);
        self
    }

    fn system(&self) -> Result<std::sync::MutexGuard<'_, System>> {
        self.system
            .lock()
            .map_err(|_| anyhow::anyhow!("system sampler mutex poisoned"))
    }
}

impl Default for SystemMetricSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for SystemMetricSource {
    fn cpu_fraction(&self) -> Result<f64> {
        let mut system = self.system()?;
        system.refresh_cpu_usage();
        Ok(f64::from(system.global_cpu_usage()) / 100.0)
    }

    fn memory_fraction(&self) -> Result<f64> {
        let mut system = self.system()?;
        system.refresh_memory();
        let total = system.total_memory();
        if total == 0 {
            bail!("total memory reported as zero");
        }
        Ok(system.used_memory() as f64 / total as f64)
    }

    fn disk_fraction(&self) -> Result<f64> {
        let disks = Disks::new_with_refreshed_list();
        let mut total: u64 = 0;
        let mut available: u64 = 0;
        for disk in disks.list() {
            total += disk.total_space();
            available += disk.available_space();
        }
        if total == 0 {
            bail!("no disks reported");
        }
        Ok(1.0 - available as f64 / total as f64)
    }

    fn gpu_fraction(&self) -> Result<f64> {
        let probe = self.gpu.as_ref().context("no GPU probe configured")?;
        probe.utilization_fraction()
    }

    fn network_io_mb(&self) -> Result<f64> {
        let networks = Networks::new_with_refreshed_list();
        let mut bytes: u64 = 0;
        for (_name, data) in networks.list() {
            bytes += data.total_received() + data.total_transmitted();
        }
        Ok(bytes as f64 / BYTES_PER_MB)
    }
}

/// Fixed readings, for tests and simulations.
#[derive(Debug, Clone)]
pub struct FixedMetricSource {
    /// CPU fraction to report
    pub cpu: f64,

    /// Memory fraction to report
    pub memory: f64,

    /// Disk fraction to report
    pub disk: f64,

    /// GPU fraction to report
    pub gpu: f64,

    /// Cumulative network I/O to report
    pub network_io_mb: f64,
}

impl FixedMetricSource {
    /// A source reporting the given CPU and memory pressure.
    pub fn new(cpu: f64, memory: f64) -> Self {
        Self {
            cpu,
            memory,
            disk: 0.4,
            gpu: 0.0,
            network_io_mb: 0.0,
        }
    }

    /// Set the GPU fraction.
    pub fn with_gpu(mut self, gpu: f64) -> Self {
        self.gpu = gpu;
        self
    }
}

impl MetricSource for FixedMetricSource {
    fn cpu_fraction(&self) -> Result<f64> {
        Ok(self.cpu)
    }

    fn memory_fraction(&self) -> Result<f64> {
        Ok(self.memory)
    }

    fn disk_fraction(&self) -> Result<f64> {
        Ok(self.disk)
    }

    fn gpu_fraction(&self) -> Result<f64> {
        Ok(self.gpu)
    }

    fn network_io_mb(&self) -> Result<f64> {
        Ok(self.network_io_mb)
    }
}
