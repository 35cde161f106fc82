//! Resource monitoring - utilization sampling and rolling history.
//!
//! The monitor answers one question for the decision engine: how loaded is
//! this machine right now? It samples through a [`MetricSource`] so the
//! hardware reads stay swappable in tests.

#![warn(missing_docs)]

pub mod gpu;
pub mod monitor;
pub mod source;

pub use gpu::GpuProbe;
#[cfg(feature = "nvml")]
pub use gpu::NvmlProbe;
pub use monitor::{MonitorConfig, MonitorStatus, ResourceMonitor, Thresholds, HISTORY_LIMIT};
pub use source::{FixedMetricSource, MetricSource, SystemMetricSource};
