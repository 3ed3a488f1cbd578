//! Application layer for ensemble
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    completion_gateway::{
        Completion, CompletionGateway, CompletionRequest, GatewayError, StreamHandle,
    },
    transcript_store::{StoreError, TranscriptStore},
    xp_store::XpStore,
};
pub use use_cases::{
    coach_turn::{CoachTurnError, CoachTurnInput, CoachTurnStream, CoachTurnUseCase},
    leaderboard::{GetLeaderboardUseCase, Leaderboard},
    progress::{DailyXp, GetProgressUseCase, GrantXpError, GrantXpUseCase, ProgressSummary},
    run_orchestration::{RunOrchestrationError, RunOrchestrationInput, RunOrchestrationUseCase},
};
