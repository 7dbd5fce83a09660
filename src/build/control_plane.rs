//! Control-plane build notification client
//!
//! During platform CI builds the control-plane is told about build progress
//! through three phase routes:
//!
//! `POST {base}/api/projects/{projectKey}/build/{env}/{before|error|done}`
//!
//! All requests are authenticated with the deploy token. Non-2xx responses
//! surface the server-provided `message` when the body carries one, so build
//! logs show the control-plane's own explanation instead of a generic error.

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::build::mode::RemoteBuildEnv;
use crate::config::FeatureFlags;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors from control-plane notification calls
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Request timed out
    #[error("Control-plane request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Could not reach the control-plane at all
    #[error("Cannot connect to the control-plane: {message}")]
    Connection { message: String },

    /// Request failed in transit
    #[error("Control-plane request failed: {message}")]
    Transport { message: String },

    /// The control-plane answered with a non-success status
    #[error("Control-plane rejected the request with HTTP {status}: {}", .server_message.as_deref().unwrap_or("no error message"))]
    Rejected {
        status: u16,
        server_message: Option<String>,
    },
}

impl NotifyError {
    /// The error message the control-plane itself provided, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            NotifyError::Rejected { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }
}

/// Body of the "before" notification
#[derive(Debug, Clone, Serialize)]
pub struct BeforePayload {
    #[serde(rename = "pagesUrl", skip_serializing_if = "Option::is_none")]
    pub pages_url: Option<String>,

    #[serde(flatten)]
    pub features: FeatureFlags,
}

/// Body of the "error" notification
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    #[serde(rename = "pagesUrl", skip_serializing_if = "Option::is_none")]
    pub pages_url: Option<String>,

    pub error: BuildErrorInfo,
}

/// Structured description of a build failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildErrorInfo {
    pub message: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Body of the "done" notification
#[derive(Debug, Clone, Serialize)]
pub struct DonePayload {
    #[serde(rename = "pagesUrl", skip_serializing_if = "Option::is_none")]
    pub pages_url: Option<String>,
}

/// Answer to the "before" notification
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct BeforeResponse {
    /// The control-plane reconfigured the project's bindings and will
    /// supersede this deployment with a fresh one
    #[serde(rename = "bindingsChanged", default)]
    pub bindings_changed: bool,
}

/// Error body shape used by the control-plane
#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    message: Option<String>,
}

/// Client for the control-plane build routes
pub struct ControlPlaneClient {
    base_url: String,
    project_key: String,
    environment: String,
    deploy_token: String,
    http_client: Client,
    timeout: Duration,
}

impl ControlPlaneClient {
    /// Creates a client with the default timeout
    pub fn new(base_url: String, remote: &RemoteBuildEnv) -> Self {
        Self::with_timeout(base_url, remote, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom timeout
    pub fn with_timeout(base_url: String, remote: &RemoteBuildEnv, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_key: remote.project_key.clone(),
            environment: remote.environment.clone(),
            deploy_token: remote.deploy_token.clone(),
            http_client,
            timeout,
        }
    }

    fn phase_url(&self, phase: &str) -> String {
        format!(
            "{}/api/projects/{}/build/{}/{}",
            self.base_url, self.project_key, self.environment, phase
        )
    }

    /// Sends one phase notification and checks the response status
    async fn post(
        &self,
        phase: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::Response, NotifyError> {
        let url = self.phase_url(phase);

        debug!("Sending build:{} notification to {}", phase, url);

        let response = self
            .http_client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.deploy_token),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    NotifyError::Connection {
                        message: e.to_string(),
                    }
                } else {
                    NotifyError::Transport {
                        message: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let server_message = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| serde_json::from_slice::<ServerErrorBody>(&bytes).ok())
                .and_then(|body| body.message);

            return Err(NotifyError::Rejected {
                status,
                server_message,
            });
        }

        Ok(response)
    }

    /// Sends the "before" notification with the project's feature flags
    ///
    /// A 2xx answer without a parsable JSON body counts as
    /// `bindingsChanged: false`.
    pub async fn notify_before(
        &self,
        payload: &BeforePayload,
    ) -> Result<BeforeResponse, NotifyError> {
        let response = self.post("before", payload).await?;

        let bytes = response.bytes().await.map_err(|e| NotifyError::Transport {
            message: e.to_string(),
        })?;

        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    /// Sends the "error" notification with the build failure details
    pub async fn notify_error(&self, payload: &ErrorPayload) -> Result<(), NotifyError> {
        self.post("error", payload).await?;
        Ok(())
    }

    /// Sends the "done" notification
    pub async fn notify_done(&self, payload: &DonePayload) -> Result<(), NotifyError> {
        self.post("done", payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_env() -> RemoteBuildEnv {
        RemoteBuildEnv {
            deploy_token: "token-123".to_string(),
            project_key: "my-project".to_string(),
            environment: "production".to_string(),
            pages_url: Some("https://example.pages.dev".to_string()),
        }
    }

    #[test]
    fn test_phase_url_layout() {
        let client = ControlPlaneClient::new("https://admin.hublink.dev/".to_string(), &remote_env());

        assert_eq!(
            client.phase_url("before"),
            "https://admin.hublink.dev/api/projects/my-project/build/production/before"
        );
    }

    #[test]
    fn test_before_payload_shape() {
        let payload = BeforePayload {
            pages_url: Some("https://example.pages.dev".to_string()),
            features: FeatureFlags {
                ai: true,
                database: true,
                ..FeatureFlags::default()
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["pagesUrl"], "https://example.pages.dev");
        assert_eq!(value["ai"], true);
        assert_eq!(value["database"], true);
        assert_eq!(value["blob"], false);
        // Flattened flags plus pagesUrl
        assert_eq!(value.as_object().unwrap().len(), 10);
    }

    #[test]
    fn test_absent_pages_url_is_omitted() {
        let payload = DonePayload { pages_url: None };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_error_payload_shape() {
        let payload = ErrorPayload {
            pages_url: None,
            error: BuildErrorInfo {
                message: "build command exited with status 2".to_string(),
                name: "BuildCommandError".to_string(),
                stack: None,
            },
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["error"]["message"], "build command exited with status 2");
        assert_eq!(value["error"]["name"], "BuildCommandError");
        assert!(value["error"].get("stack").is_none());
    }

    #[test]
    fn test_before_response_defaults() {
        let response: BeforeResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.bindings_changed);

        let response: BeforeResponse =
            serde_json::from_str(r#"{"bindingsChanged": true}"#).unwrap();
        assert!(response.bindings_changed);
    }

    #[test]
    fn test_server_message_accessor() {
        let rejected = NotifyError::Rejected {
            status: 422,
            server_message: Some("Project is paused".to_string()),
        };
        assert_eq!(rejected.server_message(), Some("Project is paused"));
        assert!(rejected.to_string().contains("Project is paused"));

        let timeout = NotifyError::Timeout { seconds: 30 };
        assert!(timeout.server_message().is_none());
    }
}
