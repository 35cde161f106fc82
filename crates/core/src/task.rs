//! Task model - the unit of work handed to the dispatcher.

use serde::{Deserialize, Serialize};

/// Priority of a task.
///
/// Ordered so that "high or above" is a plain comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Background work
    Low,

    /// Normal work
    Medium,

    /// Latency-sensitive work
    High,

    /// Must-run work
    Critical,
}

/// One unit of work to be placed and executed.
///
/// Built by the caller per invocation; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Task name (also the default remote function identifier)
    pub name: String,

    /// Priority level
    pub priority: TaskPriority,

    /// Estimated CPU demand as a fraction of the machine, in [0, 1]
    pub estimated_cpu: f64,

    /// Estimated memory demand as a fraction of the machine, in [0, 1]
    pub estimated_memory: f64,

    /// Estimated wall-clock duration in seconds
    pub estimated_duration_secs: f64,

    /// Whether the task needs a GPU
    pub requires_gpu: bool,

    /// Whether the task needs network access
    pub requires_network: bool,

    /// Whether the task may be shipped to the remote backend
    pub remote_capable: bool,

    /// Remote function identifier, when it differs from the task name
    pub remote_endpoint_hint: Option<String>,
}

impl TaskDefinition {
    /// Create a task with neutral estimates and no special requirements.
    pub fn new(name: impl Into<String>, priority: TaskPriority) -> Self {
        Self {
            name: name.into(),
            priority,
            estimated_cpu: 0.0,
            estimated_memory: 0.0,
            estimated_duration_secs: 0.0,
            requires_gpu: false,
            requires_network: false,
            remote_capable: true,
            remote_endpoint_hint: None,
        }
    }

    /// Set estimated CPU and memory demand.
    pub fn with_estimates(mut self, cpu: f64, memory: f64) -> Self {
        self.estimated_cpu = cpu;
        self.estimated_memory = memory;
        self
    }

    /// Set the estimated duration in seconds.
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.estimated_duration_secs = secs;
        self
    }

    /// Mark the task as requiring a GPU.
    pub fn with_gpu_required(mut self) -> Self {
        self.requires_gpu = true;
        self
    }

    /// Mark the task as requiring network access.
    pub fn with_network_required(mut self) -> Self {
        self.requires_network = true;
        self
    }

    /// Set whether the task may run on the remote backend.
    pub fn with_remote_capable(mut self, capable: bool) -> Self {
        self.remote_capable = capable;
        self
    }

    /// Set the remote function identifier.
    pub fn with_endpoint_hint(mut self, hint: impl Into<String>) -> Self {
        self.remote_endpoint_hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_low_to_critical() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::Medium < TaskPriority::High);
        assert!(TaskPriority::High < TaskPriority::Critical);
        assert!(TaskPriority::Critical >= TaskPriority::High);
    }

    #[test]
    fn new_task_defaults_are_neutral() {
        let task = TaskDefinition::new("noop", TaskPriority::Medium);
        assert_eq!(task.estimated_cpu, 0.0);
        assert_eq!(task.estimated_memory, 0.0);
        assert!(!task.requires_gpu);
        assert!(task.remote_capable);
        assert!(task.remote_endpoint_hint.is_none());
    }

    #[test]
    fn builders_set_fields() {
        let task = TaskDefinition::new("train", TaskPriority::High)
            .with_estimates(0.7, 0.5)
            .with_duration_secs(600.0)
            .with_gpu_required()
            .with_endpoint_hint("train-v2");
        assert_eq!(task.estimated_cpu, 0.7);
        assert_eq!(task.estimated_duration_secs, 600.0);
        assert!(task.requires_gpu);
        assert_eq!(task.remote_endpoint_hint.as_deref(), Some("train-v2"));
    }
}
