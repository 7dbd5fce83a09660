//! AI binding integrations
//!
//! This module provides the binding abstraction used by the HTTP endpoint,
//! the production REST dispatch client, and a scriptable test double.

pub mod binding;
pub mod mock;
pub mod rest;

// Re-export commonly used types
pub use binding::{AiBinding, AiError, ByteStream, JsonMap, MarkdownSource, RunOutput};
pub use mock::{MockAiBinding, MockReply, RecordedCall};
pub use rest::RestAiBinding;
