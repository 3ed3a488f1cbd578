//! Domain layer for ensemble
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Orchestration
//!
//! One query fans out to several completion models in parallel; each
//! model's answer (or failure) comes back as one entry, and a designated
//! synthesizer can merge the successful answers into a single reply.
//!
//! ## Coaching
//!
//! A persisted interview transcript whose assistant turns are streamed to
//! the client token by token (`start` → `token`* → `close` | `error`).
//!
//! ## Gamification
//!
//! Pure XP/level arithmetic and deterministic leaderboard ranking.

pub mod coaching;
pub mod core;
pub mod gamification;
pub mod orchestration;
pub mod prompt;

// Re-export commonly used types
pub use coaching::{
    entities::{CoachSession, InterviewTemplate, TranscriptMessage, TranscriptRole},
    stream::{CoachEvent, StreamEvent},
};
pub use crate::core::{
    chat::{ChatMessage, ChatRole, TokenUsage},
    error::DomainError,
    model::Model,
    query::Query,
};
pub use gamification::{
    leaderboard::{LeaderboardEntry, Period, XpGrant, rank_grants, rank_scores},
    xp::{LevelProgress, level_for_xp, xp_required},
};
pub use orchestration::{
    parsing::parse_synthesis_reply,
    value_objects::{ModelAnswer, OrchestrationOutcome, SynthesizedAnswer},
};
pub use prompt::PromptTemplate;
