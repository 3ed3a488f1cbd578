//! Use cases: the operations the HTTP surface exposes

pub mod coach_turn;
pub mod leaderboard;
pub mod progress;
pub mod run_orchestration;

pub use coach_turn::{CoachTurnError, CoachTurnInput, CoachTurnStream, CoachTurnUseCase};
pub use leaderboard::{GetLeaderboardUseCase, Leaderboard};
pub use progress::{
    DailyXp, GetProgressUseCase, GrantXpError, GrantXpUseCase, ProgressSummary,
};
pub use run_orchestration::{
    RunOrchestrationError, RunOrchestrationInput, RunOrchestrationUseCase,
};
