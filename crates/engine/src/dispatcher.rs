//! Execution dispatch with single-step fallback.

use crate::config::{ConfigError, CostModel, DecisionRules};
use crate::decision::DecisionEngine;
use crate::registry::TaskRegistry;
use async_trait::async_trait;
use offload_core::{
    ComputeDecision, ComputeLocation, ResourceSnapshot, TaskDefinition, TaskError,
};
use offload_monitor::{ResourceMonitor, Thresholds};
use offload_remote::{RemoteExecutor, RemoteRequest};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Floor for the remote invocation timeout.
const MIN_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// A unit of work the dispatcher can run.
///
/// `run` may be invoked twice: once for the primary attempt and once more
/// if the dispatcher falls back to the alternative location. Any plain
/// `Fn` closure returning a future works through the blanket impl.
#[async_trait]
pub trait Workload: Send + Sync {
    /// Run the work to a terminal outcome.
    async fn run(&self) -> Result<serde_json::Value, TaskError>;
}

#[async_trait]
impl<F, Fut> Workload for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<serde_json::Value, TaskError>> + Send + 'static,
{
    async fn run(&self) -> Result<serde_json::Value, TaskError> {
        (self)().await
    }
}

/// Error surfaced to the caller when dispatch fails for good.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The caller cancelled the work; no fallback was attempted.
    #[error("task '{0}' was cancelled")]
    Cancelled(String),

    /// The last permitted attempt failed; nothing further will be tried.
    #[error("task '{name}' failed at {location}: {source}")]
    Terminal {
        /// Task name
        name: String,

        /// Location of the failed attempt
        location: ComputeLocation,

        /// The attempt's error
        #[source]
        source: TaskError,
    },
}

/// Outcome of a successful dispatch.
#[derive(Debug)]
pub struct ExecutionReport {
    /// The placement decision that was carried out
    pub decision: ComputeDecision,

    /// Where the work actually ran (differs from the decision after fallback)
    pub location: ComputeLocation,

    /// The work's result value
    pub value: serde_json::Value,

    /// Measured wall-clock duration
    pub duration: Duration,
}

/// Engine status for external reporting.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    /// Latest resource snapshot, if anything has been sampled yet
    pub resources: Option<ResourceSnapshot>,

    /// Local acceptance thresholds
    pub thresholds: Thresholds,

    /// Whether the remote backend is configured and available
    pub remote_available: bool,

    /// Tasks currently in flight
    pub running_tasks: usize,

    /// Snapshots retained by the monitor
    pub history_length: usize,

    /// Whether current load favors local placement
    pub local_preferred: bool,
}

/// Executes tasks at their decided location, with one fallback attempt.
///
/// An explicit, constructed object: clone the `Arc`s it is built from to
/// share the monitor or remote backend, not the dispatcher itself.
pub struct ExecutionDispatcher {
    engine: DecisionEngine,
    monitor: Arc<ResourceMonitor>,
    remote: Option<Arc<dyn RemoteExecutor>>,
    registry: TaskRegistry,
}

impl ExecutionDispatcher {
    /// Create a dispatcher with default rules and no remote backend.
    pub fn new(monitor: Arc<ResourceMonitor>) -> Result<Self, ConfigError> {
        Self::with_config(monitor, DecisionRules::default(), CostModel::default())
    }

    /// Create a dispatcher with explicit rules and cost model.
    pub fn with_config(
        monitor: Arc<ResourceMonitor>,
        rules: DecisionRules,
        costs: CostModel,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: DecisionEngine::with_config(Arc::clone(&monitor), rules, costs)?,
            monitor,
            remote: None,
            registry: TaskRegistry::new(),
        })
    }

    /// Attach the remote execution backend.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteExecutor>) -> Self {
        self.engine = self.engine.with_remote(Arc::clone(&remote));
        self.remote = Some(remote);
        self
    }

    /// The in-flight task registry.
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// The decision engine used for placement.
    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Execute `task`, deciding placement first.
    ///
    /// On a primary failure the dispatcher retries exactly once at the
    /// decision's alternative location, if one was recorded; cancellation
    /// bypasses the retry entirely. The task is visible in the registry
    /// for exactly the duration of the call.
    pub async fn execute(
        &self,
        task: TaskDefinition,
        work: &dyn Workload,
    ) -> Result<ExecutionReport, DispatchError> {
        let decision = self.engine.decide(&task).await;

        info!(
            task = %task.name,
            location = %decision.location,
            confidence = decision.confidence,
            reasoning = %decision.reasoning,
            "executing task"
        );

        let _guard = self.registry.register(task.clone(), chrono::Utc::now());
        let started = std::time::Instant::now();

        match self.run_at(decision.location, &task, work).await {
            Ok(value) => {
                info!(task = %task.name, location = %decision.location, "task completed");
                Ok(ExecutionReport {
                    location: decision.location,
                    decision,
                    value,
                    duration: started.elapsed(),
                })
            }
            Err(error) if error.is_cancelled() => {
                info!(task = %task.name, "task cancelled");
                Err(DispatchError::Cancelled(task.name.clone()))
            }
            Err(error) => match decision.alternative_location {
                Some(alternative) => {
                    warn!(
                        task = %task.name,
                        %error,
                        retry_at = %alternative,
                        "primary attempt failed, retrying at alternative location"
                    );
                    match self.run_at(alternative, &task, work).await {
                        Ok(value) => {
                            info!(
                                task = %task.name,
                                location = %alternative,
                                "task completed after fallback"
                            );
                            Ok(ExecutionReport {
                                location: alternative,
                                decision,
                                value,
                                duration: started.elapsed(),
                            })
                        }
                        Err(retry_error) if retry_error.is_cancelled() => {
                            Err(DispatchError::Cancelled(task.name.clone()))
                        }
                        Err(retry_error) => Err(DispatchError::Terminal {
                            name: task.name.clone(),
                            location: alternative,
                            source: retry_error,
                        }),
                    }
                }
                None => Err(DispatchError::Terminal {
                    name: task.name.clone(),
                    location: decision.location,
                    source: error,
                }),
            },
        }
    }

    /// Status surface for external reporting.
    pub async fn status(&self) -> EngineStatus {
        let monitor_status = self.monitor.status().await;
        let rules = self.engine.rules();
        let local_preferred = monitor_status
            .latest
            .as_ref()
            .map(|snapshot| {
                snapshot.cpu_fraction < rules.high_load_cpu
                    && snapshot.memory_fraction < rules.high_load_memory
            })
            .unwrap_or(true);

        EngineStatus {
            resources: monitor_status.latest,
            thresholds: monitor_status.thresholds,
            remote_available: self.engine.remote_available(),
            running_tasks: self.registry.count(),
            history_length: monitor_status.history_length,
            local_preferred,
        }
    }

    async fn run_at(
        &self,
        location: ComputeLocation,
        task: &TaskDefinition,
        work: &dyn Workload,
    ) -> Result<serde_json::Value, TaskError> {
        match location {
            ComputeLocation::Local => work.run().await,
            ComputeLocation::Remote => self.run_remote(task).await,
        }
    }

    async fn run_remote(&self, task: &TaskDefinition) -> Result<serde_json::Value, TaskError> {
        let Some(remote) = &self.remote else {
            return Err(TaskError::Remote("no remote backend configured".to_string()));
        };

        let request = RemoteRequest {
            function_identifier: task
                .remote_endpoint_hint
                .clone()
                .unwrap_or_else(|| task.name.clone()),
            payload: serde_json::to_value(task)
                .map_err(|e| TaskError::Remote(format!("failed to serialize task metadata: {e}")))?,
            timeout: remote_timeout(task),
        };

        match remote.invoke(request).await {
            Ok(response) if response.success => Ok(response.data),
            Ok(response) => Err(TaskError::Remote(
                response
                    .error
                    .unwrap_or_else(|| "remote executor reported failure".to_string()),
            )),
            Err(error) => match error.downcast::<TaskError>() {
                Ok(task_error) => Err(task_error),
                Err(error) => Err(TaskError::Remote(error.to_string())),
            },
        }
    }
}

fn remote_timeout(task: &TaskDefinition) -> Duration {
    // Twice the caller's own estimate, floored for very short tasks.
    let estimated = Duration::from_secs_f64(task.estimated_duration_secs.max(0.0) * 2.0);
    estimated.max(MIN_REMOTE_TIMEOUT)
}
