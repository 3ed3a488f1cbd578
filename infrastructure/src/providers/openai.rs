//! OpenAI chat completions adapter (also used for OpenAI-compatible
//! custom models).

use super::sse::{DONE_SENTINEL, SseLineDecoder};
use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use ensemble_application::ports::completion_gateway::{
    Completion, CompletionRequest, GatewayError, StreamHandle,
};
use ensemble_domain::{Model, StreamEvent, TokenUsage};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiAdapter {
    pub fn new(client: reqwest::Client, api_key: String, base_url: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn body(&self, model: &Model, request: &CompletionRequest, stream: bool) -> ChatBody {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        }));

        ChatBody {
            model: model.as_str().to_string(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    async fn post(
        &self,
        body: &ChatBody,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "openai returned {status}: {detail}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<Completion, GatewayError> {
        let body = self.body(model, &request, false);
        let response: ChatResponse = self
            .post(&body)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| GatewayError::MalformedResponse("no choices in response".into()))?;

        Ok(Completion {
            text,
            usage: response.usage.map(Into::into).unwrap_or_default(),
        })
    }

    async fn stream(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<StreamHandle, GatewayError> {
        let body = self.body(model, &request, true);
        let response = self.post(&body).await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut decoder = SseLineDecoder::new();
            let mut usage: Option<TokenUsage> = None;

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                for payload in decoder.feed(&chunk) {
                    if payload == DONE_SENTINEL {
                        let _ = tx.send(StreamEvent::Completed { usage }).await;
                        return;
                    }
                    match serde_json::from_str::<StreamChunk>(&payload) {
                        Ok(parsed) => {
                            // The final usage-bearing chunk has no choices
                            if let Some(u) = parsed.usage {
                                usage = Some(u.into());
                            }
                            if let Some(content) = parsed
                                .choices
                                .into_iter()
                                .next()
                                .and_then(|c| c.delta)
                                .and_then(|d| d.content)
                            {
                                if tx.send(StreamEvent::Delta(content)).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) => debug!("Skipping unparseable stream chunk: {}", e),
                    }
                }
            }

            // Body ended without [DONE]
            let _ = tx.send(StreamEvent::Completed { usage }).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
struct ChatBody {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl From<WireUsage> for TokenUsage {
    fn from(u: WireUsage) -> Self {
        TokenUsage::new(u.prompt_tokens, u.completion_tokens)
    }
}
