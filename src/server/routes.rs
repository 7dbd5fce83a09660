//! HTTP routes for the hub AI endpoint
//!
//! The endpoint exposes `POST /_hub/ai/{command}` and dispatches to the
//! injected [`AiBinding`]. Checks run strictly in order: authorization,
//! feature gate, command parsing, body schema validation, binding call.
//! The request body is not read until all path-level checks have passed.

use axum::body::{to_bytes, Body};
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::debug;

use crate::ai::binding::{AiBinding, RunOutput};
use crate::config::FeatureFlags;
use crate::server::auth::{require_feature, AuthPolicy};
use crate::server::body::{parse_body, MarkdownBody, ModelsBody, RunBody};
use crate::server::error::ApiError;

/// Maximum accepted request body size in bytes
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared state for the endpoint handlers
#[derive(Clone)]
pub struct AppState {
    /// The AI binding requests are dispatched to
    pub ai: Arc<dyn AiBinding>,

    /// Enabled platform features for this project
    pub features: FeatureFlags,

    /// Authorization policy for incoming requests
    pub auth: AuthPolicy,
}

/// The AI commands accepted in the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiCommand {
    Run,
    Models,
    ToMarkdown,
}

impl AiCommand {
    /// Parses a path segment into a command
    pub fn parse(segment: &str) -> Result<Self, ApiError> {
        match segment {
            "run" => Ok(AiCommand::Run),
            "models" => Ok(AiCommand::Models),
            "to-markdown" => Ok(AiCommand::ToMarkdown),
            other => Err(ApiError::validation(
                "command",
                format!(
                    "unknown command '{}'. Valid commands: run, models, to-markdown",
                    other
                ),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiCommand::Run => "run",
            AiCommand::Models => "models",
            AiCommand::ToMarkdown => "to-markdown",
        }
    }
}

/// Builds the endpoint router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/_hub/ai/{command}", post(handle_ai_command))
        .with_state(state)
}

async fn handle_health() -> &'static str {
    "OK"
}

async fn handle_ai_command(
    State(state): State<AppState>,
    Path(command): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    state.auth.authorize(request.headers())?;
    require_feature(state.features.ai, "ai")?;

    let command = AiCommand::parse(&command)?;
    debug!("Dispatching AI command: {}", command.as_str());

    let bytes = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::validation("body", format!("failed to read body: {}", e)))?;

    match command {
        AiCommand::Run => {
            let valid = parse_body::<RunBody>(&bytes)?.validate()?;
            let output = state
                .ai
                .run(&valid.model, valid.params, valid.options)
                .await?;

            match output {
                RunOutput::Value(value) => Ok(Json(value).into_response()),
                RunOutput::Stream(stream) => {
                    // Image generation models answer with raw PNG bytes
                    let mut response = Response::new(Body::from_stream(stream));
                    *response.status_mut() = StatusCode::OK;
                    response
                        .headers_mut()
                        .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
                    Ok(response)
                }
            }
        }
        AiCommand::Models => {
            let body = parse_body::<ModelsBody>(&bytes)?;
            let value = state.ai.models(body.params.unwrap_or_default()).await?;
            Ok(Json(value).into_response())
        }
        AiCommand::ToMarkdown => {
            let (files, options) = parse_body::<MarkdownBody>(&bytes)?.validate()?;
            let value = state.ai.to_markdown(files, options).await?;
            Ok(Json(value).into_response())
        }
    }
}
