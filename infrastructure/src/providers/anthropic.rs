//! Anthropic messages API adapter.

use super::sse::SseLineDecoder;
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

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicAdapter {
    pub fn new(client: reqwest::Client, api_key: String, base_url: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// The versioned identifier the API expects for our model names
    fn api_model_id(model: &Model) -> String {
        match model {
            Model::ClaudeSonnet4 => "claude-sonnet-4-20250514".to_string(),
            Model::Claude3Opus => "claude-3-opus-20240229".to_string(),
            Model::Claude3Sonnet => "claude-3-sonnet-20240229".to_string(),
            Model::Claude3Haiku => "claude-3-haiku-20240307".to_string(),
            other => other.as_str().to_string(),
        }
    }

    fn body(&self, model: &Model, request: &CompletionRequest, stream: bool) -> MessagesBody {
        MessagesBody {
            model: Self::api_model_id(model),
            system: request.system.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }

    async fn post(&self, body: &MessagesBody) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "anthropic returned {status}: {detail}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<Completion, GatewayError> {
        let body = self.body(model, &request, false);
        let response: MessagesResponse = self
            .post(&body)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let text = response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
            })
            .ok_or_else(|| GatewayError::MalformedResponse("no text block in response".into()))?;

        Ok(Completion {
            text,
            usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
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
            let mut input_tokens = 0;
            let mut output_tokens = 0;

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                for payload in decoder.feed(&chunk) {
                    let event = match serde_json::from_str::<StreamEventWire>(&payload) {
                        Ok(event) => event,
                        Err(e) => {
                            debug!("Skipping unparseable stream event: {}", e);
                            continue;
                        }
                    };

                    match event {
                        StreamEventWire::MessageStart { message } => {
                            input_tokens = message.usage.input_tokens;
                        }
                        StreamEventWire::ContentBlockDelta { delta } => {
                            if let StreamDelta::TextDelta { text } = delta {
                                if tx.send(StreamEvent::Delta(text)).await.is_err() {
                                    return;
                                }
                            }
                        }
                        StreamEventWire::MessageDelta { usage } => {
                            output_tokens = usage.output_tokens;
                        }
                        StreamEventWire::MessageStop => {
                            let _ = tx
                                .send(StreamEvent::Completed {
                                    usage: Some(TokenUsage::new(input_tokens, output_tokens)),
                                })
                                .await;
                            return;
                        }
                        StreamEventWire::Error { error } => {
                            let _ = tx.send(StreamEvent::Error(error.message)).await;
                            return;
                        }
                        StreamEventWire::Other => {}
                    }
                }
            }

            let _ = tx
                .send(StreamEvent::Completed {
                    usage: Some(TokenUsage::new(input_tokens, output_tokens)),
                })
                .await;
        });

        Ok(StreamHandle::new(rx))
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
struct MessagesBody {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEventWire {
    MessageStart { message: MessageStart },
    ContentBlockDelta { delta: StreamDelta },
    MessageDelta { usage: WireUsage },
    MessageStop,
    Error { error: WireError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessageStart {
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamDelta {
    TextDelta { text: String },
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::ChatMessage;

    #[test]
    fn test_api_model_ids_are_versioned() {
        assert_eq!(
            AnthropicAdapter::api_model_id(&Model::Claude3Opus),
            "claude-3-opus-20240229"
        );
        let custom: Model = "claude-next".parse().unwrap();
        assert_eq!(AnthropicAdapter::api_model_id(&custom), "claude-next");
    }

    #[test]
    fn test_system_is_top_level_not_a_message() {
        let adapter = AnthropicAdapter::new(reqwest::Client::new(), "key".into(), None);
        let request =
            CompletionRequest::new(vec![ChatMessage::user("hi")]).with_system("be terse");
        let body = adapter.body(&Model::ClaudeSonnet4, &request, false);

        assert_eq!(body.system.as_deref(), Some("be terse"));
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
    }

    #[test]
    fn test_parse_stream_events() {
        let delta: StreamEventWire = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#,
        )
        .unwrap();
        assert!(matches!(
            delta,
            StreamEventWire::ContentBlockDelta {
                delta: StreamDelta::TextDelta { .. }
            }
        ));

        let stop: StreamEventWire = serde_json::from_str(r#"{"type":"message_stop"}"#).unwrap();
        assert!(matches!(stop, StreamEventWire::MessageStop));

        let ping: StreamEventWire = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, StreamEventWire::Other));
    }
}
