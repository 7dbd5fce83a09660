//! Mock AI binding for testing
//!
//! Queues scripted replies and records every call so tests can assert on the
//! exact arguments that reached the binding.

use super::binding::{AiBinding, AiError, JsonMap, MarkdownSource, RunOutput};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct MockAiBinding {
    replies: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<RecordedCall>>,
    name: String,
}

/// A scripted reply for the next binding call
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with a JSON value
    Value(serde_json::Value),

    /// Answer with a byte stream (run only)
    Stream(Vec<u8>),

    /// Fail with the given error
    Error(AiError),
}

/// One observed binding call with the arguments it received
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Run {
        model: String,
        params: JsonMap,
        options: JsonMap,
    },
    Models {
        params: JsonMap,
    },
    ToMarkdown {
        files: Vec<MarkdownSource>,
        options: JsonMap,
    },
}

impl MockAiBinding {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            name: "MockAi".to_string(),
        }
    }

    pub fn add_reply(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn add_replies(&self, replies: impl IntoIterator<Item = MockReply>) {
        let mut queue = self.replies.lock().unwrap();
        for reply in replies {
            queue.push_back(reply);
        }
    }

    pub fn remaining_replies(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    /// Returns a copy of every call recorded so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the most recent recorded call, if any
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_reply(&self) -> Result<MockReply, AiError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AiError::ApiError {
                message: "MockAiBinding: no more replies in queue".to_string(),
                status_code: None,
            })
    }

    /// Resolves the next reply to a plain JSON value (models, to-markdown)
    fn next_value(&self) -> Result<serde_json::Value, AiError> {
        match self.next_reply()? {
            MockReply::Value(value) => Ok(value),
            MockReply::Stream(_) => Err(AiError::InvalidResponse {
                message: "MockAiBinding: stream reply queued for a JSON operation".to_string(),
            }),
            MockReply::Error(error) => Err(error),
        }
    }
}

impl Default for MockAiBinding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiBinding for MockAiBinding {
    async fn run(
        &self,
        model: &str,
        params: JsonMap,
        options: JsonMap,
    ) -> Result<RunOutput, AiError> {
        self.record(RecordedCall::Run {
            model: model.to_string(),
            params,
            options,
        });

        match self.next_reply()? {
            MockReply::Value(value) => Ok(RunOutput::Value(value)),
            MockReply::Stream(bytes) => Ok(RunOutput::Stream(Box::pin(
                futures_util::stream::iter(vec![Ok(Bytes::from(bytes))]),
            ))),
            MockReply::Error(error) => Err(error),
        }
    }

    async fn models(&self, params: JsonMap) -> Result<serde_json::Value, AiError> {
        self.record(RecordedCall::Models { params });
        self.next_value()
    }

    async fn to_markdown(
        &self,
        files: Vec<MarkdownSource>,
        options: JsonMap,
    ) -> Result<serde_json::Value, AiError> {
        self.record(RecordedCall::ToMarkdown { files, options });
        self.next_value()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockAiBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAiBinding")
            .field("name", &self.name)
            .field("remaining_replies", &self.remaining_replies())
            .field("recorded_calls", &self.calls.lock().unwrap().len())
            .finish()
    }
}
