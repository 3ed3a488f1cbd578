//! Orchestration value objects - immutable result types for a fan-out run.
//!
//! These types represent the outputs of the orchestration pipeline:
//! - [`ModelAnswer`] - One model's answer (or failure) with its accounting
//! - [`SynthesizedAnswer`] - Optional merged answer from the synthesizer
//! - [`OrchestrationOutcome`] - Complete result returned to the caller

use crate::core::chat::TokenUsage;
use crate::core::model::Model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answer from a single model in the fan-out phase
///
/// A failed call is still an entry: `error` is populated and `response`
/// is empty, so the caller always gets one entry per requested model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAnswer {
    /// The model that produced this answer
    pub model: Model,
    /// The answer content (empty on failure)
    pub response: String,
    /// Cost in USD for this call
    pub cost: f64,
    /// Wall-clock latency of the call in milliseconds
    pub latency_ms: u64,
    /// Token counts reported by the provider
    pub tokens: TokenUsage,
    /// Error message if the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelAnswer {
    /// Creates a successful answer with its accounting.
    pub fn success(
        model: Model,
        response: impl Into<String>,
        tokens: TokenUsage,
        latency_ms: u64,
    ) -> Self {
        let cost = model.cost_for_tokens(tokens.total());
        Self {
            model,
            response: response.into(),
            cost,
            latency_ms,
            tokens,
            error: None,
        }
    }

    /// Creates a failed answer carrying the error inline.
    pub fn failure(model: Model, error: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            model,
            response: String::new(),
            cost: 0.0,
            latency_ms,
            tokens: TokenUsage::default(),
            error: Some(error.into()),
        }
    }

    /// Returns `true` if this answer was produced successfully.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Merged best-of-all-models answer from the synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizedAnswer {
    /// The model that performed the synthesis
    pub model: Model,
    /// The synthesized answer
    pub content: String,
    /// Short description of how the answers were merged
    pub methodology: String,
    /// Cost in USD of the synthesis call
    pub cost: f64,
}

impl SynthesizedAnswer {
    pub fn new(
        model: Model,
        content: impl Into<String>,
        methodology: impl Into<String>,
        cost: f64,
    ) -> Self {
        Self {
            model,
            content: content.into(),
            methodology: methodology.into(),
            cost,
        }
    }
}

/// Complete result of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
    /// The original query
    pub query: String,
    /// Free-text context the caller supplied, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// One entry per requested model, in request order
    pub responses: Vec<ModelAnswer>,
    /// Merged answer, when synthesis ran and succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesized: Option<SynthesizedAnswer>,
    /// Sum of all per-model costs plus the synthesis cost
    pub total_cost: f64,
    /// Maximum per-model latency (the fan-out ran in parallel)
    pub total_latency_ms: u64,
    /// When the run completed
    pub timestamp: DateTime<Utc>,
}

impl OrchestrationOutcome {
    pub fn new(
        query: impl Into<String>,
        context: Option<String>,
        responses: Vec<ModelAnswer>,
        synthesized: Option<SynthesizedAnswer>,
    ) -> Self {
        let total_cost = responses.iter().map(|r| r.cost).sum::<f64>()
            + synthesized.as_ref().map(|s| s.cost).unwrap_or(0.0);
        let total_latency_ms = responses.iter().map(|r| r.latency_ms).max().unwrap_or(0);

        Self {
            query: query.into(),
            context,
            responses,
            synthesized,
            total_cost,
            total_latency_ms,
            timestamp: Utc::now(),
        }
    }

    /// Iterate over the answers that succeeded
    pub fn successful(&self) -> impl Iterator<Item = &ModelAnswer> {
        self.responses.iter().filter(|r| r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_no_cost() {
        let a = ModelAnswer::failure(Model::Gpt4o, "timeout", 500);
        assert!(!a.is_success());
        assert_eq!(a.cost, 0.0);
        assert_eq!(a.tokens.total(), 0);
    }

    #[test]
    fn test_success_cost_uses_model_pricing() {
        let a = ModelAnswer::success(Model::Gpt4oMini, "hi", TokenUsage::new(500, 500), 1200);
        assert!(a.is_success());
        assert!((a.cost - 0.0015).abs() < 1e-9);
    }

    #[test]
    fn test_outcome_totals() {
        let answers = vec![
            ModelAnswer::success(Model::Gpt4o, "a", TokenUsage::new(1000, 0), 800),
            ModelAnswer::failure(Model::ClaudeSonnet4, "boom", 1500),
        ];
        let synth = SynthesizedAnswer::new(Model::Gpt4o, "merged", "picked the good bits", 0.01);
        let outcome = OrchestrationOutcome::new("q", None, answers, Some(synth));

        assert!((outcome.total_cost - 0.04).abs() < 1e-9);
        assert_eq!(outcome.total_latency_ms, 1500);
        assert_eq!(outcome.successful().count(), 1);
    }

    #[test]
    fn test_error_field_skipped_when_none() {
        let a = ModelAnswer::success(Model::Gpt4o, "x", TokenUsage::default(), 1);
        let json = serde_json::to_value(&a).unwrap();
        assert!(json.get("error").is_none());
    }
}
