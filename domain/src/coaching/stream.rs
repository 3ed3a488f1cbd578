//! Streaming events for the coaching relay.
//!
//! Two event vocabularies meet here:
//!
//! - [`StreamEvent`] bridges infrastructure-level streaming (SSE chunks
//!   from a completion API) to the application layer.
//! - [`CoachEvent`] is what the relay emits to the browser:
//!   `start` → `token`* → `close` | `error`.

use crate::core::chat::TokenUsage;
use serde::Serialize;
use uuid::Uuid;

/// An event in a streaming completion response from a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text chunk from the model
    Delta(String),
    /// Stream ended normally; carries usage when the provider reported it
    Completed { usage: Option<TokenUsage> },
    /// The stream aborted
    Error(String),
}

impl StreamEvent {
    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed { .. } | StreamEvent::Error(_))
    }
}

/// An event emitted to the client over the coaching SSE endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum CoachEvent {
    /// Stream opened; emitted exactly once, before any token
    Start,
    /// One incremental content chunk
    Token { value: String },
    /// Stream finished and the assistant turn was persisted
    Close { session_id: Uuid },
    /// Upstream failure; tokens already forwarded remain visible
    Error { message: String },
}

impl CoachEvent {
    /// SSE `event:` field name
    pub fn name(&self) -> &'static str {
        match self {
            CoachEvent::Start => "start",
            CoachEvent::Token { .. } => "token",
            CoachEvent::Close { .. } => "close",
            CoachEvent::Error { .. } => "error",
        }
    }

    /// SSE `data:` payload as JSON
    pub fn payload(&self) -> String {
        match self {
            CoachEvent::Start => "{}".to_string(),
            CoachEvent::Token { value } => {
                serde_json::json!({ "value": value }).to_string()
            }
            CoachEvent::Close { session_id } => {
                serde_json::json!({ "session_id": session_id }).to_string()
            }
            CoachEvent::Error { message } => {
                serde_json::json!({ "message": message }).to_string()
            }
        }
    }
}
