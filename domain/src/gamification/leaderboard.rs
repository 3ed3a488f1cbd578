//! Leaderboard ranking.
//!
//! Scores are aggregated per user and ranked descending. Ties are broken
//! by ascending user id so the ordering is fully deterministic rather
//! than an artifact of query order.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One XP grant for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpGrant {
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: String,
    pub granted_at: DateTime<Utc>,
}

impl XpGrant {
    pub fn new(user_id: Uuid, amount: i64, reason: impl Into<String>) -> Self {
        Self {
            user_id,
            amount,
            reason: reason.into(),
            granted_at: Utc::now(),
        }
    }
}

/// Ranking window for a leaderboard query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Weekly,
    Monthly,
    AllTime,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::AllTime => "all_time",
        }
    }

    /// Inclusive start bound of the period containing `now`, if bounded.
    ///
    /// Weeks start Sunday 00:00 UTC, months on the 1st.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Period::Weekly => {
                let days_from_sunday = now.weekday().num_days_from_sunday() as i64;
                let date = (now - Duration::days(days_from_sunday)).date_naive();
                Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()))
            }
            Period::Monthly => Some(
                Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                    .single()
                    .unwrap(),
            ),
            Period::AllTime => None,
        }
    }
}

impl std::str::FromStr for Period {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "all_time" | "all-time" => Ok(Period::AllTime),
            other => Err(crate::core::error::DomainError::InvalidPeriod(
                other.to_string(),
            )),
        }
    }
}

/// One row of a ranked leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub score: i64,
}

/// Rank per-user aggregate scores: descending by score, ties by user id.
pub fn rank_scores(totals: impl IntoIterator<Item = (Uuid, i64)>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut totals: Vec<(Uuid, i64)> = totals.into_iter().collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    totals
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (user_id, score))| LeaderboardEntry {
            rank: i as u32 + 1,
            user_id,
            score,
        })
        .collect()
}

/// Aggregate raw grants into per-user sums, then rank them.
pub fn rank_grants(grants: &[XpGrant], limit: usize) -> Vec<LeaderboardEntry> {
    let mut sums: std::collections::HashMap<Uuid, i64> = std::collections::HashMap::new();
    for grant in grants {
        *sums.entry(grant.user_id).or_insert(0) += grant.amount;
    }
    rank_scores(sums, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_rank_descending() {
        let entries = rank_scores(vec![(uid(1), 50), (uid(2), 200), (uid(3), 100)], 10);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].user_id, uid(2));
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[2].user_id, uid(1));
        assert_eq!(entries[2].rank, 3);
    }

    #[test]
    fn test_tie_broken_by_user_id() {
        let a = rank_scores(vec![(uid(9), 100), (uid(3), 100)], 10);
        let b = rank_scores(vec![(uid(3), 100), (uid(9), 100)], 10);
        assert_eq!(a, b);
        assert_eq!(a[0].user_id, uid(3));
    }

    #[test]
    fn test_limit_applied_after_sort() {
        let entries = rank_scores(vec![(uid(1), 1), (uid(2), 3), (uid(3), 2)], 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].user_id, uid(3));
    }

    #[test]
    fn test_rank_grants_aggregates_per_user() {
        let grants = vec![
            XpGrant::new(uid(1), 40, "lesson"),
            XpGrant::new(uid(2), 30, "quiz"),
            XpGrant::new(uid(1), 20, "quiz"),
        ];
        let entries = rank_grants(&grants, 10);
        assert_eq!(entries[0].user_id, uid(1));
        assert_eq!(entries[0].score, 60);
        assert_eq!(entries[1].score, 30);
    }

    #[test]
    fn test_weekly_period_starts_sunday() {
        // 2026-08-26 is a Wednesday
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 15, 30, 0).unwrap();
        let start = Period::Weekly.start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 23, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_monthly_period_starts_first() {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 15, 30, 0).unwrap();
        let start = Period::Monthly.start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_all_time_is_unbounded() {
        assert!(Period::AllTime.start(Utc::now()).is_none());
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("weekly".parse::<Period>().unwrap(), Period::Weekly);
        assert_eq!("all-time".parse::<Period>().unwrap(), Period::AllTime);
        assert!("yearly".parse::<Period>().is_err());
    }
}
