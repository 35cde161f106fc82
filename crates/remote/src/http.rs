//! HTTP remote executor backend.

use crate::trait_::{RemoteExecutor, RemoteRequest, RemoteResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::debug;

/// Remote executor speaking JSON over HTTP.
///
/// Functions are invoked with `POST {base_url}/functions/{identifier}`; the
/// body is the request payload and the response body must parse as a
/// [`RemoteResponse`].
#[derive(Clone)]
pub struct HttpRemoteExecutor {
    /// HTTP client
    client: Client,

    /// Backend base URL
    base_url: String,
}

impl HttpRemoteExecutor {
    /// Create an executor for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: ClientBuilder::new().build().unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RemoteExecutor for HttpRemoteExecutor {
    async fn invoke(&self, request: RemoteRequest) -> Result<RemoteResponse> {
        let url = format!(
            "{}/functions/{}",
            self.base_url, request.function_identifier
        );

        debug!(function = %request.function_identifier, timeout = ?request.timeout, "invoking remote function");

        let response = self
            .client
            .post(&url)
            .timeout(request.timeout)
            .json(&request.payload)
            .send()
            .await
            .context("Failed to call remote executor")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Remote executor error (status {}): {}", status, error_text);
        }

        response
            .json::<RemoteResponse>()
            .await
            .context("Failed to parse remote executor response")
    }
}

#[cfg(test)]
mod tests {
    use crate::trait_::RemoteResponse;

    #[test]
    fn response_parses_backend_failure_body() {
        let body = r#"{"success": false, "data": null, "error": "function not found"}"#;
        let response: RemoteResponse = serde_json::from_str(body).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("function not found"));
    }
}
