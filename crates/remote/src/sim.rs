//! Simulated remote executor - an in-memory stand-in for tests.

use crate::trait_::{RemoteExecutor, RemoteRequest, RemoteResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the simulated backend does with each invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedOutcome {
    /// Succeed, echoing the payload back as data
    Succeed,

    /// Complete the call but report `success == false`
    Reject,

    /// Fail the call itself
    Fail,
}

/// In-memory remote executor double.
///
/// Echoes payloads back on success and counts invocations so tests can
/// assert the dispatcher's single-retry law. Not a real backend.
pub struct SimulatedRemoteExecutor {
    outcome: SimulatedOutcome,
    available: bool,
    invocations: AtomicUsize,
}

impl SimulatedRemoteExecutor {
    /// A backend that succeeds on every call.
    pub fn succeeding() -> Self {
        Self::with_outcome(SimulatedOutcome::Succeed)
    }

    /// A backend that completes calls but reports failure.
    pub fn rejecting() -> Self {
        Self::with_outcome(SimulatedOutcome::Reject)
    }

    /// A backend whose calls themselves fail.
    pub fn failing() -> Self {
        Self::with_outcome(SimulatedOutcome::Fail)
    }

    /// A backend with the given per-call outcome.
    pub fn with_outcome(outcome: SimulatedOutcome) -> Self {
        Self {
            outcome,
            available: true,
            invocations: AtomicUsize::new(0),
        }
    }

    /// Set whether the backend reports itself available.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// How many times `invoke` has been called.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteExecutor for SimulatedRemoteExecutor {
    async fn invoke(&self, request: RemoteRequest) -> Result<RemoteResponse, anyhow::Error> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            SimulatedOutcome::Succeed => Ok(RemoteResponse {
                success: true,
                data: request.payload,
                error: None,
            }),
            SimulatedOutcome::Reject => Ok(RemoteResponse {
                success: false,
                data: serde_json::Value::Null,
                error: Some("simulated rejection".to_string()),
            }),
            SimulatedOutcome::Fail => anyhow::bail!("simulated transport failure"),
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn request() -> RemoteRequest {
        RemoteRequest {
            function_identifier: "echo".to_string(),
            payload: json!({"n": 7}),
            timeout: Duration::from_secs(30),
        }
    }

    #[tokio::test]
    async fn succeeding_backend_echoes_payload() {
        let remote = SimulatedRemoteExecutor::succeeding();
        let response = remote.invoke(request()).await.unwrap();
        assert!(response.success);
        assert_eq!(response.data, json!({"n": 7}));
        assert_eq!(remote.invocations(), 1);
    }

    #[tokio::test]
    async fn rejecting_backend_reports_failure_without_erroring() {
        let remote = SimulatedRemoteExecutor::rejecting();
        let response = remote.invoke(request()).await.unwrap();
        assert!(!response.success);
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn failing_backend_errors() {
        let remote = SimulatedRemoteExecutor::failing();
        assert!(remote.invoke(request()).await.is_err());
        assert_eq!(remote.invocations(), 1);
    }

    #[test]
    fn availability_is_configurable() {
        let remote = SimulatedRemoteExecutor::succeeding().with_availability(false);
        assert!(!remote.is_available());
    }
}
