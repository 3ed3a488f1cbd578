//! Provider adapters for external completion APIs

pub mod anthropic;
pub mod google;
pub mod openai;
pub mod routing;
pub mod sse;

use async_trait::async_trait;
use ensemble_application::ports::completion_gateway::{
    Completion, CompletionRequest, GatewayError, StreamHandle,
};
use ensemble_domain::Model;

/// The provider families this gateway can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
        }
    }
}

/// One provider-specific HTTP adapter
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Send a request and wait for the full response
    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<Completion, GatewayError>;

    /// Send a request and stream the response.
    ///
    /// Adapters without a native streaming path fall back to wrapping a
    /// blocking completion in a two-event stream.
    async fn stream(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let completion = self.complete(model, request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(2);
        let _ = tx
            .send(ensemble_domain::StreamEvent::Delta(completion.text))
            .await;
        let _ = tx
            .send(ensemble_domain::StreamEvent::Completed {
                usage: Some(completion.usage),
            })
            .await;
        Ok(StreamHandle::new(rx))
    }
}
