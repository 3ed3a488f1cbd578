//! XP curve arithmetic.
//!
//! Levels follow an exponential curve: `xp_required(level)` is the
//! cumulative XP at which that level begins. A brand new user with 0 XP
//! sits at level 1; level 2 starts at 282 XP, level 10 at 3162 XP.

use serde::{Deserialize, Serialize};

/// Cumulative XP required to hold `level`: `floor(100 * level^1.5)`.
///
/// `xp_required(0)` is 0 so the curve is total on `u32`, but levels are
/// 1-based everywhere else.
pub fn xp_required(level: u32) -> u64 {
    (100.0 * (level as f64).powf(1.5)).floor() as u64
}

/// The level a cumulative XP total corresponds to (minimum 1).
///
/// Inverts the curve in closed form, `level = (total / 100)^(2/3)`,
/// then nudges the estimate to absorb float rounding. Runs in constant
/// time regardless of the total.
pub fn level_for_xp(total_xp: u64) -> u32 {
    let estimate = ((total_xp as f64) / 100.0).powf(2.0 / 3.0) as u64;
    let mut level = estimate.clamp(1, u32::MAX as u64) as u32;
    while level > 1 && xp_required(level) > total_xp {
        level -= 1;
    }
    while level < u32::MAX && xp_required(level + 1) <= total_xp {
        level += 1;
    }
    level
}

/// A user's position on the XP curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    /// Cumulative XP total
    pub total_xp: u64,
    /// XP earned inside the current level
    pub xp_into_level: u64,
    /// XP span of the current level
    pub xp_for_next_level: u64,
    /// Fraction of the current level completed, in `[0, 1)`
    pub progress: f64,
}

impl LevelProgress {
    /// Compute the full progress summary for a cumulative XP total.
    pub fn from_total_xp(total_xp: u64) -> Self {
        let level = level_for_xp(total_xp);
        let floor = if level == 1 { 0 } else { xp_required(level) };
        let ceiling = xp_required(level + 1);
        let span = ceiling - floor;
        let into = total_xp - floor;

        Self {
            level,
            total_xp,
            xp_into_level: into,
            xp_for_next_level: span,
            progress: into as f64 / span as f64,
        }
    }
}
