//! Remote executor abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A request to invoke a remote compute function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRequest {
    /// Which function to invoke
    pub function_identifier: String,

    /// Task metadata and arguments
    pub payload: serde_json::Value,

    /// How long the backend may take before the call is abandoned
    pub timeout: Duration,
}

/// Response from a remote compute function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// Whether the function completed successfully
    pub success: bool,

    /// Function result
    pub data: serde_json::Value,

    /// Failure description when `success` is false
    pub error: Option<String>,
}

/// Remote execution backend - invokes compute functions off-box.
///
/// The dispatcher treats `success == false` and a returned error
/// identically; implementations may use whichever fits their transport.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Invoke a remote function and wait for its terminal outcome.
    async fn invoke(&self, request: RemoteRequest) -> Result<RemoteResponse, anyhow::Error>;

    /// Whether the backend is currently configured and reachable.
    fn is_available(&self) -> bool {
        true
    }
}
