//! Google generateContent adapter.
//!
//! Streaming for Gemini models falls back to the adapter trait's
//! wrap-a-completion default; only the coach endpoint streams and it is
//! configured with an OpenAI model by default.

use super::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use ensemble_application::ports::completion_gateway::{
    Completion, CompletionRequest, GatewayError,
};
use ensemble_domain::{ChatRole, Model, TokenUsage};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GoogleAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleAdapter {
    pub fn new(client: reqwest::Client, api_key: String, base_url: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn body(request: &CompletionRequest) -> GenerateBody {
        GenerateBody {
            system_instruction: request.system.as_ref().map(|s| Content {
                role: None,
                parts: vec![Part { text: s.clone() }],
            }),
            contents: request
                .messages
                .iter()
                .map(|m| Content {
                    // Gemini uses "model" for assistant turns
                    role: Some(match m.role {
                        ChatRole::Assistant => "model".to_string(),
                        _ => "user".to_string(),
                    }),
                    parts: vec![Part {
                        text: m.content.clone(),
                    }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<Completion, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            model.as_str(),
            self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&Self::body(&request))
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "google returned {status}: {detail}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GatewayError::MalformedResponse("no candidates in response".into()))?;

        let usage = parsed
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(Completion { text, usage })
    }
}

// ==================== Wire types ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_domain::ChatMessage;

    #[test]
    fn test_body_maps_assistant_to_model_role() {
        let request = CompletionRequest::new(vec![
            ChatMessage::user("q"),
            ChatMessage::assistant("a"),
        ])
        .with_system("sys");
        let body = GoogleAdapter::body(&request);

        assert!(body.system_instruction.is_some());
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
        assert_eq!(body.contents[1].role.as_deref(), Some("model"));
    }

    #[test]
    fn test_parse_generate_response() {
        let json = r#"{
            "candidates": [{"content": {"parts": [{"text": "answer"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "answer");
        assert_eq!(parsed.usage_metadata.unwrap().prompt_token_count, 10);
    }
}
