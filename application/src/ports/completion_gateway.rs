//! Completion gateway port
//!
//! Defines the interface for communicating with external completion APIs.

use async_trait::async_trait;
use ensemble_domain::{ChatMessage, Model, StreamEvent, TokenUsage};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("No API key configured for provider of model {0}")]
    MissingApiKey(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Transport closed")]
    TransportClosed,
}

/// One completion request to an upstream model
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt, sent the way each provider expects it
    pub system: Option<String>,
    /// Conversation messages in order
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            system: None,
            messages,
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A completed (non-streaming) upstream response
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Handle for receiving streaming events from an upstream completion.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience
/// methods for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed { .. } => return Ok(full_text),
                StreamEvent::Error(e) => return Err(GatewayError::RequestFailed(e)),
            }
        }
        // Channel closed without Completed — return what we have
        Ok(full_text)
    }
}

/// Gateway for completion API communication
///
/// This port defines how the application layer talks to model providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Send a request and wait for the full response
    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<Completion, GatewayError>;

    /// Send a request and stream the response token by token.
    ///
    /// Default implementation calls `complete()` and wraps the result in
    /// a single `Delta` followed by `Completed`, so non-streaming
    /// implementations work without changes.
    async fn stream(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let completion = self.complete(model, request).await?;
        let (tx, rx) = mpsc::channel(2);
        let _ = tx.send(StreamEvent::Delta(completion.text)).await;
        let _ = tx
            .send(StreamEvent::Completed {
                usage: Some(completion.usage),
            })
            .await;
        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_text_concatenates_deltas() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("Hel".into())).await.unwrap();
        tx.send(StreamEvent::Delta("lo".into())).await.unwrap();
        tx.send(StreamEvent::Completed { usage: None }).await.unwrap();
        drop(tx);

        let text = StreamHandle::new(rx).collect_text().await.unwrap();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn test_collect_text_surfaces_stream_error() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Delta("partial".into())).await.unwrap();
        tx.send(StreamEvent::Error("connection reset".into()))
            .await
            .unwrap();
        drop(tx);

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed(_)));
    }
}
