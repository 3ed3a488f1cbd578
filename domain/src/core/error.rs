//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No models selected for orchestration")]
    NoModels,

    #[error("All models failed to respond")]
    AllModelsFailed,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Unknown leaderboard period: {0}")]
    InvalidPeriod(String),

    #[error("Orchestration error: {0}")]
    OrchestrationError(String),
}
