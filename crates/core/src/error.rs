//! Terminal outcomes of a unit of work.

use thiserror::Error;

/// Error produced by executing a unit of work at some location.
///
/// The dispatcher retries most failures once at the decision's alternative
/// location; `Cancelled` is exempt and always surfaces directly.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Caller-initiated cancellation; never triggers the fallback retry.
    #[error("task cancelled")]
    Cancelled,

    /// The remote executor reported or caused a failure.
    #[error("remote execution failed: {0}")]
    Remote(String),

    /// The work itself failed.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl TaskError {
    /// Whether this is a caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }
}
