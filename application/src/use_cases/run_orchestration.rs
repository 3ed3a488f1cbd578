//! Run Orchestration use case
//!
//! Fans one query out to every selected model in parallel, reassembles
//! the answers in request order, and optionally asks a synthesizer model
//! to merge the successful ones.

use crate::ports::completion_gateway::{
    CompletionGateway, CompletionRequest, GatewayError,
};
use ensemble_domain::{
    ChatMessage, Model, ModelAnswer, OrchestrationOutcome, PromptTemplate, Query,
    SynthesizedAnswer, parse_synthesis_reply,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors that can occur before the fan-out starts.
///
/// Per-model failures are never errors: they come back inline in the
/// affected entry, and a run where every model failed still returns an
/// outcome (with no synthesized section).
#[derive(Error, Debug)]
pub enum RunOrchestrationError {
    #[error("No models selected")]
    NoModels,
}

/// Input for the RunOrchestration use case
#[derive(Debug, Clone)]
pub struct RunOrchestrationInput {
    /// The query to fan out
    pub query: Query,
    /// Optional free-text context prepended to the query
    pub context: Option<String>,
    /// Models to query, in the order the caller wants the answers back
    pub models: Vec<Model>,
    /// Sampling temperature for the fan-out calls
    pub temperature: f32,
    /// Whether to run the synthesis stage
    pub synthesize: bool,
    /// Model used for synthesis
    pub synthesizer: Model,
}

impl RunOrchestrationInput {
    pub fn new(query: impl Into<Query>, models: Vec<Model>) -> Self {
        Self {
            query: query.into(),
            context: None,
            models,
            temperature: 0.7,
            synthesize: false,
            synthesizer: Model::default_synthesizer(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_synthesis(mut self) -> Self {
        self.synthesize = true;
        self
    }

    pub fn with_synthesizer(mut self, model: Model) -> Self {
        self.synthesizer = model;
        self
    }
}

/// Use case for running a multi-model orchestration
pub struct RunOrchestrationUseCase<G: CompletionGateway + 'static> {
    gateway: Arc<G>,
}

impl<G: CompletionGateway + 'static> RunOrchestrationUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Execute the use case
    pub async fn execute(
        &self,
        input: RunOrchestrationInput,
    ) -> Result<OrchestrationOutcome, RunOrchestrationError> {
        if input.models.is_empty() {
            return Err(RunOrchestrationError::NoModels);
        }

        info!("Starting orchestration with {} models", input.models.len());

        let responses = self.fan_out(&input).await;

        let synthesized = if input.synthesize {
            self.synthesize(&input, &responses).await
        } else {
            None
        };

        Ok(OrchestrationOutcome::new(
            input.query.content(),
            input.context,
            responses,
            synthesized,
        ))
    }

    /// Query all models in parallel; one entry per model, request order.
    async fn fan_out(&self, input: &RunOrchestrationInput) -> Vec<ModelAnswer> {
        let mut join_set = JoinSet::new();

        for (index, model) in input.models.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let model = model.clone();
            let query = input.query.content().to_string();
            let context = input.context.clone();
            let temperature = input.temperature;

            join_set.spawn(async move {
                let started = Instant::now();
                let result = Self::query_model(&gateway, &model, &query, context.as_deref(), temperature).await;
                let latency_ms = started.elapsed().as_millis() as u64;

                let answer = match result {
                    Ok(completion) => {
                        info!("Model {} responded in {}ms", model, latency_ms);
                        ModelAnswer::success(model, completion.text, completion.usage, latency_ms)
                    }
                    Err(e) => {
                        warn!("Model {} failed: {}", model, e);
                        ModelAnswer::failure(model, e.to_string(), latency_ms)
                    }
                };
                (index, answer)
            });
        }

        // Tasks complete in arbitrary order; slot each answer back into
        // the position its model was requested at.
        let mut slots: Vec<Option<ModelAnswer>> = (0..input.models.len()).map(|_| None).collect();

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, answer)) => slots[index] = Some(answer),
                Err(e) => warn!("Task join error: {}", e),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    ModelAnswer::failure(input.models[i].clone(), "task panicked", 0)
                })
            })
            .collect()
    }

    /// Synthesis stage: merge the successful answers, degrade on failure.
    async fn synthesize(
        &self,
        input: &RunOrchestrationInput,
        responses: &[ModelAnswer],
    ) -> Option<SynthesizedAnswer> {
        let successful: Vec<&ModelAnswer> = responses.iter().filter(|r| r.is_success()).collect();

        if successful.is_empty() {
            debug!("Skipping synthesis: no successful answers");
            return None;
        }

        let prompt = PromptTemplate::synthesis_prompt(input.query.content(), &successful);
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_system(PromptTemplate::synthesis_system())
            .with_temperature(0.3)
            .with_max_tokens(3000);

        match self.gateway.complete(&input.synthesizer, request).await {
            Ok(completion) => {
                let (content, methodology) = parse_synthesis_reply(&completion.text);
                let cost = input.synthesizer.cost_for_tokens(completion.usage.total());
                Some(SynthesizedAnswer::new(
                    input.synthesizer.clone(),
                    content,
                    methodology,
                    cost,
                ))
            }
            Err(e) => {
                // Synthesis failure degrades gracefully; the per-model
                // answers are still returned.
                warn!("Synthesis failed: {}", e);
                None
            }
        }
    }

    /// Query a single model
    async fn query_model(
        gateway: &G,
        model: &Model,
        query: &str,
        context: Option<&str>,
        temperature: f32,
    ) -> Result<crate::ports::completion_gateway::Completion, GatewayError> {
        let prompt = PromptTemplate::answer_query(query, context);
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_system(PromptTemplate::answer_system())
            .with_temperature(temperature);

        gateway.complete(model, request).await
    }
}
