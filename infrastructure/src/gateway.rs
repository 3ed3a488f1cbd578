//! HTTP completion gateway
//!
//! Implements the application layer's [`CompletionGateway`] port by routing
//! each request to the provider adapter responsible for the model's family.
//! Providers without an API key are simply not registered; requests for
//! their models fail with `MissingApiKey` instead of hitting the network.

use crate::config::ProvidersConfig;
use crate::providers::anthropic::AnthropicAdapter;
use crate::providers::google::GoogleAdapter;
use crate::providers::openai::OpenAiAdapter;
use crate::providers::routing::provider_for;
use crate::providers::{ProviderAdapter, ProviderKind};
use async_trait::async_trait;
use ensemble_application::ports::completion_gateway::{
    Completion, CompletionGateway, CompletionRequest, GatewayError, StreamHandle,
};
use ensemble_domain::Model;
use std::collections::HashMap;

pub struct HttpCompletionGateway {
    adapters: HashMap<ProviderKind, Box<dyn ProviderAdapter>>,
}

impl HttpCompletionGateway {
    /// Build a gateway from provider configuration, registering one adapter
    /// per provider that has an API key.
    pub fn from_config(client: reqwest::Client, providers: &ProvidersConfig) -> Self {
        let mut adapters: HashMap<ProviderKind, Box<dyn ProviderAdapter>> = HashMap::new();

        if let Some(key) = providers.openai.api_key.clone() {
            adapters.insert(
                ProviderKind::OpenAi,
                Box::new(OpenAiAdapter::new(
                    client.clone(),
                    key,
                    providers.openai.base_url.clone(),
                )),
            );
        }
        if let Some(key) = providers.anthropic.api_key.clone() {
            adapters.insert(
                ProviderKind::Anthropic,
                Box::new(AnthropicAdapter::new(
                    client.clone(),
                    key,
                    providers.anthropic.base_url.clone(),
                )),
            );
        }
        if let Some(key) = providers.google.api_key.clone() {
            adapters.insert(
                ProviderKind::Google,
                Box::new(GoogleAdapter::new(
                    client,
                    key,
                    providers.google.base_url.clone(),
                )),
            );
        }

        tracing::info!(
            providers = ?adapters.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            "completion gateway configured"
        );
        Self { adapters }
    }

    /// Which providers have an adapter registered
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        self.adapters.keys().copied().collect()
    }

    fn adapter_for(&self, model: &Model) -> Result<&dyn ProviderAdapter, GatewayError> {
        let kind = provider_for(model);
        self.adapters
            .get(&kind)
            .map(|a| a.as_ref())
            .ok_or_else(|| GatewayError::MissingApiKey(model.as_str().to_string()))
    }
}

#[async_trait]
impl CompletionGateway for HttpCompletionGateway {
    async fn complete(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<Completion, GatewayError> {
        self.adapter_for(model)?.complete(model, request).await
    }

    async fn stream(
        &self,
        model: &Model,
        request: CompletionRequest,
    ) -> Result<StreamHandle, GatewayError> {
        self.adapter_for(model)?.stream(model, request).await
    }
}
