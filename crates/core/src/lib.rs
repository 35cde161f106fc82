//! Offload core data models.
//!
//! This crate defines the shapes that flow between the resource monitor,
//! the decision engine, and the execution dispatcher.

#![warn(missing_docs)]

mod decision;
mod error;
mod id;
mod snapshot;
mod task;

pub use decision::{ComputeDecision, ComputeLocation};
pub use error::TaskError;
pub use id::TaskId;
pub use snapshot::ResourceSnapshot;
pub use task::{TaskDefinition, TaskPriority};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
