//! Bookkeeping of in-flight tasks.

use offload_core::{TaskDefinition, TaskId, Time};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A task currently executing somewhere.
#[derive(Debug, Clone, Serialize)]
pub struct RunningTask {
    /// Registry id, derived from the name and start time
    pub id: TaskId,

    /// The task definition as submitted
    pub task: TaskDefinition,

    /// When execution started
    pub started_at: Time,
}

/// Tracks tasks that are currently in flight.
///
/// Pure bookkeeping - no placement logic lives here. Cheap to clone; all
/// clones share one map behind a single mutex, and the mutex is never held
/// across an await.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Mutex<HashMap<TaskId, RunningTask>>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task starting now, returning a guard that unregisters it
    /// when dropped.
    pub fn register(&self, task: TaskDefinition, started_at: Time) -> RegistrationGuard {
        let id = TaskId::derive(&task.name, started_at);
        let entry = RunningTask {
            id: id.clone(),
            task,
            started_at,
        };
        self.lock().insert(id.clone(), entry);
        RegistrationGuard {
            registry: self.clone(),
            id,
        }
    }

    /// Remove a task entry.
    pub fn unregister(&self, id: &TaskId) {
        self.lock().remove(id);
    }

    /// All tasks currently in flight.
    pub fn list(&self) -> Vec<RunningTask> {
        self.lock().values().cloned().collect()
    }

    /// Number of tasks currently in flight.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TaskId, RunningTask>> {
        // A poisoned lock still holds valid bookkeeping; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Removes its registry entry when dropped.
///
/// The dispatcher holds this across the whole attempt, fallback included,
/// so no exit path - success, terminal error, cancellation, or the future
/// being dropped - can leak a ghost entry.
pub struct RegistrationGuard {
    registry: TaskRegistry,
    id: TaskId,
}

impl RegistrationGuard {
    /// The registered id.
    pub fn id(&self) -> &TaskId {
        &self.id
    }
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registry.unregister(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offload_core::TaskPriority;

    fn task(name: &str) -> TaskDefinition {
        TaskDefinition::new(name, TaskPriority::Medium)
    }

    #[test]
    fn register_and_drop_round_trip() {
        let registry = TaskRegistry::new();
        {
            let guard = registry.register(task("ingest"), chrono::Utc::now());
            assert_eq!(registry.count(), 1);
            assert_eq!(registry.list()[0].id, *guard.id());
        }
        assert_eq!(registry.count(), 0);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn guards_remove_only_their_own_entry() {
        let registry = TaskRegistry::new();
        let a = registry.register(task("a"), chrono::Utc::now());
        let b = registry.register(task("b"), chrono::Utc::now());
        assert_eq!(registry.count(), 2);

        drop(a);
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.list()[0].id, *b.id());
    }

    #[test]
    fn clones_share_the_same_map() {
        let registry = TaskRegistry::new();
        let clone = registry.clone();
        let _guard = registry.register(task("shared"), chrono::Utc::now());
        assert_eq!(clone.count(), 1);
    }

    #[test]
    fn explicit_unregister_is_idempotent_with_the_guard() {
        let registry = TaskRegistry::new();
        let guard = registry.register(task("x"), chrono::Utc::now());
        registry.unregister(guard.id());
        assert_eq!(registry.count(), 0);
        drop(guard);
        assert_eq!(registry.count(), 0);
    }
}
