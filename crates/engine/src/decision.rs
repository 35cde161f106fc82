//! The placement algorithm.

use crate::config::{validate_thresholds, ConfigError, CostModel, DecisionRules};
use offload_core::{
    ComputeDecision, ComputeLocation, ResourceSnapshot, TaskDefinition, TaskPriority,
};
use offload_monitor::ResourceMonitor;
use offload_remote::RemoteExecutor;
use std::sync::Arc;
use tracing::debug;

/// Nominal confidence for a remote choice.
const REMOTE_CONFIDENCE: f64 = 0.8;

/// Confidence when local is forced with no cleanly feasible location.
const CONSTRAINED_CONFIDENCE: f64 = 0.4;

/// Duration inflation for remote network overhead.
const REMOTE_OVERHEAD_FACTOR: f64 = 1.2;

/// Duration inflation when running locally under resource pressure.
const CONSTRAINED_LOCAL_FACTOR: f64 = 1.5;

/// Decides where a task should execute.
///
/// Aside from taking a fresh snapshot, `decide` is a pure function of the
/// task, the snapshot, and the configured thresholds - no hidden state
/// mutation, so concurrent decisions interleave freely.
pub struct DecisionEngine {
    monitor: Arc<ResourceMonitor>,
    remote: Option<Arc<dyn RemoteExecutor>>,
    rules: DecisionRules,
    costs: CostModel,
}

impl DecisionEngine {
    /// Create an engine with default rules over the given monitor.
    pub fn new(monitor: Arc<ResourceMonitor>) -> Result<Self, ConfigError> {
        Self::with_config(monitor, DecisionRules::default(), CostModel::default())
    }

    /// Create an engine with explicit rules and cost model.
    ///
    /// All cutoffs are validated here so a decision can never fail later.
    pub fn with_config(
        monitor: Arc<ResourceMonitor>,
        rules: DecisionRules,
        costs: CostModel,
    ) -> Result<Self, ConfigError> {
        validate_thresholds(&monitor.thresholds())?;
        rules.validate()?;
        costs.validate()?;
        Ok(Self {
            monitor,
            remote: None,
            rules,
            costs,
        })
    }

    /// Attach the remote backend consulted for feasibility.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteExecutor>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// The configured preference rules.
    pub fn rules(&self) -> &DecisionRules {
        &self.rules
    }

    /// Whether a remote backend is configured and reporting available.
    pub fn remote_available(&self) -> bool {
        self.remote
            .as_ref()
            .map(|remote| remote.is_available())
            .unwrap_or(false)
    }

    /// Decide where `task` should execute, against a fresh snapshot.
    pub async fn decide(&self, task: &TaskDefinition) -> ComputeDecision {
        let snapshot = self.monitor.sample().await;
        let decision = self.decide_with_snapshot(task, &snapshot);
        debug!(
            task = %task.name,
            location = %decision.location,
            confidence = decision.confidence,
            "placement decided"
        );
        decision
    }

    /// The decision rule against an existing snapshot.
    pub fn decide_with_snapshot(
        &self,
        task: &TaskDefinition,
        snapshot: &ResourceSnapshot,
    ) -> ComputeDecision {
        let local_feasible = self.local_feasible(task, snapshot);
        let remote_feasible = self.remote_available() && task.remote_capable;
        let prefer_remote = self.prefers_remote(task, snapshot);

        if local_feasible && !prefer_remote {
            ComputeDecision {
                location: ComputeLocation::Local,
                reasoning: format!(
                    "Local execution preferred - sufficient resources available \
                     (CPU: {:.1}%, memory: {:.1}%)",
                    snapshot.cpu_fraction * 100.0,
                    snapshot.memory_fraction * 100.0
                ),
                confidence: local_confidence(snapshot),
                estimated_cost: 0.0,
                estimated_duration_secs: task.estimated_duration_secs,
                alternative_location: remote_feasible.then_some(ComputeLocation::Remote),
            }
        } else if remote_feasible {
            ComputeDecision {
                location: ComputeLocation::Remote,
                reasoning: format!(
                    "Remote execution chosen - {}",
                    if local_feasible {
                        "better suited for task requirements"
                    } else {
                        "local resources insufficient"
                    }
                ),
                confidence: REMOTE_CONFIDENCE,
                estimated_cost: self.costs.remote_cost(task),
                estimated_duration_secs: task.estimated_duration_secs * REMOTE_OVERHEAD_FACTOR,
                alternative_location: local_feasible.then_some(ComputeLocation::Local),
            }
        } else {
            // Last resort: run locally even though no location is cleanly
            // feasible, with the degradation signalled through confidence
            // and the inflated duration estimate.
            ComputeDecision {
                location: ComputeLocation::Local,
                reasoning: "Local execution as fallback - remote backend unavailable".to_string(),
                confidence: CONSTRAINED_CONFIDENCE,
                estimated_cost: 0.0,
                estimated_duration_secs: task.estimated_duration_secs * CONSTRAINED_LOCAL_FACTOR,
                alternative_location: None,
            }
        }
    }

    fn local_feasible(&self, task: &TaskDefinition, snapshot: &ResourceSnapshot) -> bool {
        let thresholds = self.monitor.thresholds();
        if snapshot.cpu_fraction + task.estimated_cpu > thresholds.cpu_max {
            return false;
        }
        if snapshot.memory_fraction + task.estimated_memory > thresholds.memory_max {
            return false;
        }
        if task.requires_gpu
            && (!self.monitor.gpu_enabled() || snapshot.gpu_fraction > thresholds.gpu_max)
        {
            return false;
        }
        true
    }

    fn prefers_remote(&self, task: &TaskDefinition, snapshot: &ResourceSnapshot) -> bool {
        // Heavy, urgent tasks are worth the shipping overhead.
        if task.priority >= TaskPriority::High
            && (task.estimated_cpu > self.rules.heavy_task_cpu
                || task.estimated_memory > self.rules.heavy_task_memory)
        {
            return true;
        }

        // Long-running tasks should not tie the machine up.
        if task.estimated_duration_secs > self.rules.long_task_secs {
            return true;
        }

        // The machine is already under pressure.
        snapshot.cpu_fraction > self.rules.high_load_cpu
            || snapshot.memory_fraction > self.rules.high_load_memory
    }
}

fn local_confidence(snapshot: &ResourceSnapshot) -> f64 {
    let raw = 0.4
        + 0.4 * (1.0 - snapshot.cpu_fraction)
        + 0.4 * (1.0 - snapshot.memory_fraction);
    raw.clamp(0.1, 0.95)
}
