//! AI binding abstraction layer
//!
//! This module provides the core trait and types for talking to the platform's
//! managed AI binding. The HTTP endpoint dispatches validated requests through
//! an `AiBinding` implementation, which keeps the transport (REST dispatch
//! service, test double) out of the request handling logic.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::fmt;

/// String-keyed JSON object, used for free-form `params` and `options`
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Boxed byte stream produced by streaming model invocations
pub type ByteStream = BoxStream<'static, Result<Bytes, AiError>>;

/// Errors that can occur during binding operations
#[derive(Debug, Clone)]
pub enum AiError {
    /// The binding rejected the request with the given message
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Request timed out after the specified duration (in seconds)
    TimeoutError { seconds: u64 },

    /// Network-related error
    NetworkError { message: String },

    /// Invalid or malformed response from the binding
    InvalidResponse { message: String },

    /// Configuration error (missing endpoint, invalid settings, etc.)
    ConfigurationError { message: String },
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::ApiError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "AI binding error ({}): {}", code, message)
                } else {
                    write!(f, "AI binding error: {}", message)
                }
            }
            AiError::TimeoutError { seconds } => {
                write!(f, "AI request timed out after {} seconds", seconds)
            }
            AiError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            AiError::InvalidResponse { message } => {
                write!(f, "Invalid response from AI binding: {}", message)
            }
            AiError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for AiError {}

/// Result of a model invocation
///
/// Most models answer with a JSON value that is forwarded to the client
/// verbatim. Image generation models answer with a raw byte stream instead,
/// which the endpoint serves as a binary response without buffering.
pub enum RunOutput {
    /// A JSON value to forward as-is
    Value(serde_json::Value),

    /// A raw byte stream (e.g., a generated image)
    Stream(ByteStream),
}

impl fmt::Debug for RunOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutput::Value(value) => f.debug_tuple("Value").field(value).finish(),
            RunOutput::Stream(_) => f.debug_tuple("Stream").field(&"..").finish(),
        }
    }
}

/// A named document submitted for markdown conversion
///
/// The HTTP endpoint accepts file payloads base64-encoded inside JSON and
/// decodes them before they reach the binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSource {
    /// Client-supplied file name, used by the converter to pick a parser
    pub name: String,

    /// Raw file contents
    pub blob: Vec<u8>,
}

/// Core trait for the platform AI binding
///
/// The three operations mirror the commands accepted by the HTTP endpoint.
/// Production wiring uses [`RestAiBinding`](crate::ai::rest::RestAiBinding);
/// tests substitute [`MockAiBinding`](crate::ai::mock::MockAiBinding).
///
/// # Example
///
/// ```ignore
/// use hublink::ai::binding::{AiBinding, JsonMap};
///
/// async fn list_models(binding: &dyn AiBinding) -> Result<(), Box<dyn std::error::Error>> {
///     let models = binding.models(JsonMap::new()).await?;
///     println!("{models}");
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait AiBinding: Send + Sync {
    /// Invokes a model with the given parameters
    ///
    /// # Arguments
    ///
    /// * `model` - Trimmed, non-empty model identifier
    /// * `params` - Model inputs (empty map when the client sent none)
    /// * `options` - Invocation options such as gateway settings (empty map
    ///   when the client sent none)
    ///
    /// # Errors
    ///
    /// Returns `AiError` if the binding call fails, times out, or responds
    /// with something unusable.
    async fn run(
        &self,
        model: &str,
        params: JsonMap,
        options: JsonMap,
    ) -> Result<RunOutput, AiError>;

    /// Lists the models available to this project
    async fn models(&self, params: JsonMap) -> Result<serde_json::Value, AiError>;

    /// Converts one or more documents to markdown
    async fn to_markdown(
        &self,
        files: Vec<MarkdownSource>,
        options: JsonMap,
    ) -> Result<serde_json::Value, AiError>;

    /// Returns the human-readable name of this binding
    fn name(&self) -> &str;
}
