//! REST implementation of the AI binding
//!
//! This client talks to the platform's AI dispatch service over HTTP. Each
//! binding operation maps to one dispatch route:
//!
//! - `POST {endpoint}/run/{model}` - invoke a model
//! - `POST {endpoint}/models` - list available models
//! - `POST {endpoint}/to-markdown` - convert documents to markdown
//!
//! Model invocations normally answer with JSON. When the dispatch service
//! answers with any other content type (image generation models stream PNG
//! bytes), the body is exposed as a byte stream instead of being buffered.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::StreamExt;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::ai::binding::{AiBinding, AiError, JsonMap, MarkdownSource, RunOutput};
use crate::config::{ConfigError, HubConfig};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client for the platform AI dispatch service
///
/// # Example
///
/// ```
/// use hublink::ai::rest::RestAiBinding;
///
/// let binding = RestAiBinding::new(
///     "https://ai.hublink.dev/dispatch".to_string(),
///     Some("token".to_string()),
/// );
/// ```
pub struct RestAiBinding {
    endpoint: String,
    token: Option<String>,
    http_client: Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct RunRequest<'a> {
    params: &'a JsonMap,
    options: &'a JsonMap,
}

#[derive(Serialize)]
struct ModelsRequest<'a> {
    params: &'a JsonMap,
}

#[derive(Serialize)]
struct MarkdownRequest<'a> {
    files: Vec<MarkdownFilePayload>,
    options: &'a JsonMap,
}

#[derive(Serialize)]
struct MarkdownFilePayload {
    name: String,
    blob: String,
}

impl RestAiBinding {
    /// Creates a new dispatch client with the default timeout
    pub fn new(endpoint: String, token: Option<String>) -> Self {
        Self::with_timeout(endpoint, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new dispatch client with a custom timeout
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Dispatch service base URL
    /// * `token` - Optional bearer token
    /// * `timeout` - Request timeout duration
    pub fn with_timeout(endpoint: String, token: Option<String>, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            http_client,
            timeout,
        }
    }

    /// Creates a dispatch client from the project configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingAiEndpoint` if `HUBLINK_AI_ENDPOINT` is
    /// not configured.
    pub fn from_config(config: &HubConfig) -> Result<Self, ConfigError> {
        let endpoint = config
            .ai_endpoint
            .clone()
            .ok_or(ConfigError::MissingAiEndpoint)?;

        Ok(Self::new(endpoint, config.ai_token.clone()))
    }

    /// Sends a JSON POST to the given dispatch route
    async fn post(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::Response, AiError> {
        let mut request = self.http_client.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                error!("AI dispatch request timed out after {:?}", self.timeout);
                AiError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                }
            } else if e.is_connect() {
                error!("Cannot connect to AI dispatch service at {}", self.endpoint);
                AiError::NetworkError {
                    message: format!("Connection failed: {}", e),
                }
            } else {
                error!("AI dispatch request error: {}", e);
                AiError::NetworkError {
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!("AI dispatch service returned status {}: {}", status, body);

            return Err(AiError::ApiError {
                message: format!("HTTP {}: {}", status, body),
                status_code: Some(status.as_u16()),
            });
        }

        Ok(response)
    }

    /// Parses a dispatch response body as JSON
    async fn json_body(response: reqwest::Response) -> Result<serde_json::Value, AiError> {
        response.json().await.map_err(|e| {
            error!("Failed to parse AI dispatch response: {}", e);
            AiError::InvalidResponse {
                message: format!("JSON parse error: {}", e),
            }
        })
    }
}

#[async_trait]
impl AiBinding for RestAiBinding {
    async fn run(
        &self,
        model: &str,
        params: JsonMap,
        options: JsonMap,
    ) -> Result<RunOutput, AiError> {
        let url = format!("{}/run/{}", self.endpoint, model);

        debug!("Dispatching model run: model={}", model);
        let start = Instant::now();

        let response = self
            .post(
                &url,
                &RunRequest {
                    params: &params,
                    options: &options,
                },
            )
            .await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.starts_with("application/json") {
            let value = Self::json_body(response).await?;
            info!(
                "Model run completed in {:.2}s: model={}",
                start.elapsed().as_secs_f64(),
                model
            );
            Ok(RunOutput::Value(value))
        } else {
            debug!(
                "Model run answered with content type '{}', streaming body",
                content_type
            );
            let stream = response
                .bytes_stream()
                .map(|chunk| {
                    chunk.map_err(|e| AiError::NetworkError {
                        message: format!("Stream read failed: {}", e),
                    })
                })
                .boxed();
            Ok(RunOutput::Stream(stream))
        }
    }

    async fn models(&self, params: JsonMap) -> Result<serde_json::Value, AiError> {
        let url = format!("{}/models", self.endpoint);

        debug!("Listing models");
        let response = self.post(&url, &ModelsRequest { params: &params }).await?;
        Self::json_body(response).await
    }

    async fn to_markdown(
        &self,
        files: Vec<MarkdownSource>,
        options: JsonMap,
    ) -> Result<serde_json::Value, AiError> {
        let url = format!("{}/to-markdown", self.endpoint);

        debug!("Converting {} file(s) to markdown", files.len());

        let payload = MarkdownRequest {
            files: files
                .into_iter()
                .map(|file| MarkdownFilePayload {
                    name: file.name,
                    blob: STANDARD.encode(&file.blob),
                })
                .collect(),
            options: &options,
        };

        let response = self.post(&url, &payload).await?;
        Self::json_body(response).await
    }

    fn name(&self) -> &str {
        "rest"
    }
}
