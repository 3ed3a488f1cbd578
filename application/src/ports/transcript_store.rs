//! Transcript store port
//!
//! Persistence interface for coaching sessions, interview templates and
//! transcript messages. Implementations live in the infrastructure layer.

use async_trait::async_trait;
use ensemble_domain::{CoachSession, InterviewTemplate, TokenUsage, TranscriptMessage, TranscriptRole};
use thiserror::Error;
use uuid::Uuid;

/// Errors from persistence operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

/// Persistence for coaching sessions and their transcripts
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Create a new session, optionally bound to a template
    async fn create_session(&self, template_id: Option<Uuid>) -> Result<CoachSession, StoreError>;

    /// Load a session by id
    async fn get_session(&self, session_id: Uuid) -> Result<CoachSession, StoreError>;

    /// Append one transcript message to a session
    async fn append_message(
        &self,
        session_id: Uuid,
        role: TranscriptRole,
        content: &str,
    ) -> Result<TranscriptMessage, StoreError>;

    /// The most recent `limit` messages of a session, oldest first
    async fn history(
        &self,
        session_id: Uuid,
        limit: usize,
    ) -> Result<Vec<TranscriptMessage>, StoreError>;

    /// Add one turn's token usage to the session's running totals
    async fn record_usage(&self, session_id: Uuid, usage: TokenUsage) -> Result<(), StoreError>;

    /// Create an interview template
    async fn create_template(
        &self,
        template: InterviewTemplate,
    ) -> Result<InterviewTemplate, StoreError>;

    /// Load a template by id
    async fn get_template(&self, template_id: Uuid) -> Result<InterviewTemplate, StoreError>;

    /// List all templates
    async fn list_templates(&self) -> Result<Vec<InterviewTemplate>, StoreError>;
}
