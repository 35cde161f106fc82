//! The resource monitor - on-demand sampling with a bounded history.

use crate::source::MetricSource;
use offload_core::ResourceSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::warn;

/// Maximum number of snapshots retained for trend queries.
pub const HISTORY_LIMIT: usize = 100;

/// Substituted for a utilization metric whose read failed.
const NEUTRAL_UTILIZATION: f64 = 0.5;

/// Safe utilization thresholds for accepting work locally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Max CPU fraction after adding the task's estimate
    pub cpu_max: f64,

    /// Max memory fraction after adding the task's estimate
    pub memory_max: f64,

    /// Max disk fraction
    pub disk_max: f64,

    /// Max GPU fraction for GPU-requiring tasks
    pub gpu_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_max: 0.8,
            memory_max: 0.85,
            disk_max: 0.9,
            gpu_max: 0.9,
        }
    }
}

/// Monitor configuration.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Whether GPU utilization is sampled at all
    pub gpu_enabled: bool,

    /// Threshold table shared with the decision engine
    pub thresholds: Thresholds,
}

/// Read-only monitor summary for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    /// Most recent snapshot, if anything has been sampled yet
    pub latest: Option<ResourceSnapshot>,

    /// Threshold table
    pub thresholds: Thresholds,

    /// Number of retained snapshots
    pub history_length: usize,
}

/// Samples local utilization on demand and retains a rolling history.
///
/// Sampling never fails: an individual metric read error is logged and
/// replaced with a neutral default. The history holds at most
/// [`HISTORY_LIMIT`] snapshots, oldest evicted first.
pub struct ResourceMonitor {
    source: Box<dyn MetricSource>,
    config: MonitorConfig,
    history: Mutex<VecDeque<ResourceSnapshot>>,
}

impl ResourceMonitor {
    /// Create a monitor over the given metric source.
    pub fn new(source: Box<dyn MetricSource>, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_LIMIT)),
        }
    }

    /// The threshold table.
    pub fn thresholds(&self) -> Thresholds {
        self.config.thresholds
    }

    /// Whether GPU sampling is enabled.
    pub fn gpu_enabled(&self) -> bool {
        self.config.gpu_enabled
    }

    /// Capture a fresh snapshot and append it to the history.
    pub async fn sample(&self) -> ResourceSnapshot {
        let cpu_fraction = read_fraction("cpu", self.source.cpu_fraction());
        let memory_fraction = read_fraction("memory", self.source.memory_fraction());
        let disk_fraction = read_fraction("disk", self.source.disk_fraction());
        let gpu_fraction = if self.config.gpu_enabled {
            read_fraction("gpu", self.source.gpu_fraction())
        } else {
            0.0
        };
        let network_io_mb = match self.source.network_io_mb() {
            Ok(mb) => mb.max(0.0),
            Err(error) => {
                warn!(metric = "network", %error, "metric read failed, substituting 0");
                0.0
            }
        };

        let snapshot = ResourceSnapshot {
            cpu_fraction,
            memory_fraction,
            disk_fraction,
            gpu_fraction,
            network_io_mb,
            captured_at: chrono::Utc::now(),
        };

        let mut history = self.history.lock().await;
        history.push_back(snapshot.clone());
        if history.len() > HISTORY_LIMIT {
            history.pop_front();
        }

        snapshot
    }

    /// The most recent snapshot, without sampling.
    pub async fn latest(&self) -> Option<ResourceSnapshot> {
        self.history.lock().await.back().cloned()
    }

    /// Number of retained snapshots.
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Read-only summary. Never samples, so repeated calls without an
    /// intervening `sample()` return identical data.
    pub async fn status(&self) -> MonitorStatus {
        let history = self.history.lock().await;
        MonitorStatus {
            latest: history.back().cloned(),
            thresholds: self.config.thresholds,
            history_length: history.len(),
        }
    }
}

fn read_fraction(metric: &'static str, read: anyhow::Result<f64>) -> f64 {
    match read {
        Ok(value) => value.clamp(0.0, 1.0),
        Err(error) => {
            warn!(metric, %error, "metric read failed, substituting neutral default");
            NEUTRAL_UTILIZATION
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FixedMetricSource;
    use anyhow::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports a CPU fraction that climbs on every read.
    struct RampSource {
        reads: AtomicUsize,
    }

    impl RampSource {
        fn new() -> Self {
            Self {
                reads: AtomicUsize::new(0),
            }
        }
    }

    impl MetricSource for RampSource {
        fn cpu_fraction(&self) -> anyhow::Result<f64> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(n as f64 / 1000.0)
        }

        fn memory_fraction(&self) -> anyhow::Result<f64> {
            Ok(0.2)
        }

        fn disk_fraction(&self) -> anyhow::Result<f64> {
            Ok(0.2)
        }

        fn gpu_fraction(&self) -> anyhow::Result<f64> {
            Ok(0.0)
        }

        fn network_io_mb(&self) -> anyhow::Result<f64> {
            Ok(0.0)
        }
    }

    /// Every read fails.
    struct BrokenSource;

    impl MetricSource for BrokenSource {
        fn cpu_fraction(&self) -> anyhow::Result<f64> {
            bail!("cpu read failed")
        }

        fn memory_fraction(&self) -> anyhow::Result<f64> {
            bail!("memory read failed")
        }

        fn disk_fraction(&self) -> anyhow::Result<f64> {
            bail!("disk read failed")
        }

        fn gpu_fraction(&self) -> anyhow::Result<f64> {
            bail!("gpu read failed")
        }

        fn network_io_mb(&self) -> anyhow::Result<f64> {
            bail!("network read failed")
        }
    }

    fn gpu_enabled_config() -> MonitorConfig {
        MonitorConfig {
            gpu_enabled: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn history_is_capped_and_evicts_oldest_first() {
        let monitor = ResourceMonitor::new(Box::new(RampSource::new()), MonitorConfig::default());
        for _ in 0..150 {
            monitor.sample().await;
        }

        assert_eq!(monitor.history_len().await, HISTORY_LIMIT);

        // Reads 0..=49 were evicted; the oldest retained snapshot is read 50.
        let history = monitor.history.lock().await;
        let oldest = history.front().unwrap();
        assert!((oldest.cpu_fraction - 0.050).abs() < 1e-9);
        let newest = history.back().unwrap();
        assert!((newest.cpu_fraction - 0.149).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failed_reads_substitute_neutral_defaults() {
        let monitor = ResourceMonitor::new(Box::new(BrokenSource), gpu_enabled_config());
        let snapshot = monitor.sample().await;

        assert_eq!(snapshot.cpu_fraction, NEUTRAL_UTILIZATION);
        assert_eq!(snapshot.memory_fraction, NEUTRAL_UTILIZATION);
        assert_eq!(snapshot.disk_fraction, NEUTRAL_UTILIZATION);
        assert_eq!(snapshot.gpu_fraction, NEUTRAL_UTILIZATION);
        assert_eq!(snapshot.network_io_mb, 0.0);
        assert_eq!(monitor.history_len().await, 1);
    }

    #[tokio::test]
    async fn gpu_is_not_sampled_when_disabled() {
        let source = FixedMetricSource::new(0.3, 0.3).with_gpu(0.9);
        let monitor = ResourceMonitor::new(Box::new(source), MonitorConfig::default());
        let snapshot = monitor.sample().await;
        assert_eq!(snapshot.gpu_fraction, 0.0);
    }

    #[tokio::test]
    async fn gpu_is_sampled_when_enabled() {
        let source = FixedMetricSource::new(0.3, 0.3).with_gpu(0.9);
        let monitor = ResourceMonitor::new(Box::new(source), gpu_enabled_config());
        let snapshot = monitor.sample().await;
        assert_eq!(snapshot.gpu_fraction, 0.9);
    }

    #[tokio::test]
    async fn out_of_range_fractions_are_clamped() {
        let mut source = FixedMetricSource::new(1.7, -0.2);
        source.disk = 2.0;
        let monitor = ResourceMonitor::new(Box::new(source), MonitorConfig::default());
        let snapshot = monitor.sample().await;
        assert_eq!(snapshot.cpu_fraction, 1.0);
        assert_eq!(snapshot.memory_fraction, 0.0);
        assert_eq!(snapshot.disk_fraction, 1.0);
    }

    #[tokio::test]
    async fn status_is_idempotent_without_sampling() {
        let monitor = ResourceMonitor::new(
            Box::new(FixedMetricSource::new(0.3, 0.3)),
            MonitorConfig::default(),
        );
        monitor.sample().await;

        let first = monitor.status().await;
        let second = monitor.status().await;
        assert_eq!(first, second);
        assert_eq!(first.history_length, 1);
    }

    #[tokio::test]
    async fn status_before_first_sample_has_no_snapshot() {
        let monitor = ResourceMonitor::new(
            Box::new(FixedMetricSource::new(0.3, 0.3)),
            MonitorConfig::default(),
        );
        let status = monitor.status().await;
        assert!(status.latest.is_none());
        assert_eq!(status.history_length, 0);
    }
}
