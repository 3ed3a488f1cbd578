//! Gamification domain: XP curve and leaderboard ranking
//!
//! Pure business formulas. Storage of grants and totals lives behind the
//! application layer's `XpStore` port.

pub mod leaderboard;
pub mod xp;

pub use leaderboard::{LeaderboardEntry, Period, XpGrant, rank_grants, rank_scores};
pub use xp::{LevelProgress, level_for_xp, xp_required};
