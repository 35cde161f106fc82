//! Unique identifiers for in-flight tasks.

use crate::Time;
use serde::{Deserialize, Serialize};

/// Unique identifier for a dispatched task.
///
/// Derived from the task name and its start time, so the id stays stable
/// for the lifetime of one execution and reads naturally in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Derive an id from a task name and the execution start time.
    pub fn derive(name: &str, started_at: Time) -> Self {
        Self(format!("{}_{}", name, started_at.timestamp_millis()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
