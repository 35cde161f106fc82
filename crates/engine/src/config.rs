//! Engine configuration - preference rules and the cost model.

use offload_core::TaskDefinition;
use offload_monitor::Thresholds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error produced when engine configuration is invalid.
///
/// Raised at construction, never at decision time: a decision always has
/// the forced-local fallback, so the only way to make placement impossible
/// is a bad configuration, and that is rejected up front.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A cutoff that must lie in (0, 1] is out of range.
    #[error("{name} must be in (0, 1], got {value}")]
    CutoffOutOfRange {
        /// Which knob was out of range
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A threshold or duration that must be positive is not.
    #[error("{name} must be positive, got {value}")]
    NonPositive {
        /// Which knob was out of range
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A cost rate is negative.
    #[error("{name} must be non-negative, got {value}")]
    NegativeRate {
        /// Which rate was negative
        name: &'static str,
        /// The rejected value
        value: f64,
    },
}

fn check_cutoff(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::CutoffOutOfRange { name, value })
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeRate { name, value })
    }
}

/// Heuristic cutoffs that route feasible-locally tasks to remote anyway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionRules {
    /// CPU fraction above which the machine counts as heavily loaded
    pub high_load_cpu: f64,

    /// Memory fraction above which the machine counts as heavily loaded
    pub high_load_memory: f64,

    /// Estimated CPU demand above which a high-priority task counts as heavy
    pub heavy_task_cpu: f64,

    /// Estimated memory demand above which a high-priority task counts as heavy
    pub heavy_task_memory: f64,

    /// Estimated duration above which a task counts as long-running
    pub long_task_secs: f64,
}

impl Default for DecisionRules {
    fn default() -> Self {
        Self {
            high_load_cpu: 0.7,
            high_load_memory: 0.7,
            heavy_task_cpu: 0.6,
            heavy_task_memory: 0.6,
            long_task_secs: 300.0,
        }
    }
}

impl DecisionRules {
    /// Validate all cutoffs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_cutoff("high_load_cpu", self.high_load_cpu)?;
        check_cutoff("high_load_memory", self.high_load_memory)?;
        check_cutoff("heavy_task_cpu", self.heavy_task_cpu)?;
        check_cutoff("heavy_task_memory", self.heavy_task_memory)?;
        if self.long_task_secs <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "long_task_secs",
                value: self.long_task_secs,
            });
        }
        Ok(())
    }
}

/// Linear cost estimator for remote execution. Local cost is always zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostModel {
    /// Flat cost per remote invocation
    pub base_execution_cost: f64,

    /// Cost per unit of estimated CPU + memory demand
    pub resource_cost_rate: f64,

    /// Cost per estimated second of runtime
    pub duration_cost_rate: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            base_execution_cost: 0.01,
            resource_cost_rate: 0.005,
            duration_cost_rate: 0.001,
        }
    }
}

impl CostModel {
    /// Validate all rates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate("base_execution_cost", self.base_execution_cost)?;
        check_rate("resource_cost_rate", self.resource_cost_rate)?;
        check_rate("duration_cost_rate", self.duration_cost_rate)?;
        Ok(())
    }

    /// Estimated cost of running `task` on the remote backend.
    pub fn remote_cost(&self, task: &TaskDefinition) -> f64 {
        self.base_execution_cost
            + (task.estimated_cpu + task.estimated_memory) * self.resource_cost_rate
            + task.estimated_duration_secs * self.duration_cost_rate
    }
}

/// Validate the monitor's threshold table for use by the decision engine.
pub fn validate_thresholds(thresholds: &Thresholds) -> Result<(), ConfigError> {
    check_cutoff("cpu_max", thresholds.cpu_max)?;
    check_cutoff("memory_max", thresholds.memory_max)?;
    check_cutoff("disk_max", thresholds.disk_max)?;
    check_cutoff("gpu_max", thresholds.gpu_max)?;
    Ok(())
}
