//! System resource utilization snapshots.

use crate::Time;
use serde::{Deserialize, Serialize};

/// A point-in-time reading of local resource utilization.
///
/// Utilization fields are fractions in [0, 1]. Immutable once captured;
/// the monitor appends snapshots to its bounded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// CPU utilization fraction
    pub cpu_fraction: f64,

    /// Memory utilization fraction
    pub memory_fraction: f64,

    /// Disk utilization fraction
    pub disk_fraction: f64,

    /// GPU utilization fraction (0.0 when GPU sampling is disabled)
    pub gpu_fraction: f64,

    /// Cumulative network I/O in megabytes
    pub network_io_mb: f64,

    /// When the snapshot was captured
    pub captured_at: Time,
}
