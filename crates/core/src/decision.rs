//! Placement decisions.

use serde::{Deserialize, Serialize};

/// The execution venue for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeLocation {
    /// The local machine
    Local,

    /// The remote compute-function backend
    Remote,
}

impl ComputeLocation {
    /// The other location.
    pub fn other(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
        }
    }
}

impl std::fmt::Display for ComputeLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Where a task should execute, and why.
///
/// Produced fresh for every dispatch and never mutated afterwards. Carries
/// the one location the dispatcher is allowed to retry at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeDecision {
    /// Chosen location
    pub location: ComputeLocation,

    /// Human-readable explanation of the choice
    pub reasoning: String,

    /// Self-reported certainty in [0, 1]; observability only
    pub confidence: f64,

    /// Estimated monetary cost (always 0.0 for local execution)
    pub estimated_cost: f64,

    /// Duration estimate in seconds, adjusted for the chosen location
    pub estimated_duration_secs: f64,

    /// The non-chosen but still feasible location, eligible for one retry
    pub alternative_location: Option<ComputeLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_renders_lowercase() {
        assert_eq!(ComputeLocation::Local.to_string(), "local");
        assert_eq!(ComputeLocation::Remote.to_string(), "remote");
    }

    #[test]
    fn other_flips_location() {
        assert_eq!(ComputeLocation::Local.other(), ComputeLocation::Remote);
        assert_eq!(ComputeLocation::Remote.other(), ComputeLocation::Local);
    }
}
