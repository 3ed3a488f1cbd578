//! Get Leaderboard use case
//!
//! All-time rankings come straight from cumulative totals; weekly and
//! monthly rankings are computed by summing the grants inside the
//! current period.

use crate::ports::transcript_store::StoreError;
use crate::ports::xp_store::XpStore;
use chrono::{DateTime, Utc};
use ensemble_domain::{LeaderboardEntry, Period, rank_grants, rank_scores};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LIMIT: usize = 20;

/// A ranked leaderboard plus the period it covers
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,
    pub entries: Vec<LeaderboardEntry>,
}

/// Use case for ranking users by XP
pub struct GetLeaderboardUseCase {
    xp: Arc<dyn XpStore>,
}

impl GetLeaderboardUseCase {
    pub fn new(xp: Arc<dyn XpStore>) -> Self {
        Self { xp }
    }

    pub async fn execute(&self, period: Period, limit: usize) -> Result<Leaderboard, StoreError> {
        let now = Utc::now();
        let period_start = period.start(now);

        let entries = match period_start {
            None => {
                let totals = self.xp.all_totals().await?;
                rank_scores(totals, limit)
            }
            Some(start) => {
                let grants = self.xp.grants_since(start).await?;
                debug!("Ranking {} grants since {}", grants.len(), start);
                rank_grants(&grants, limit)
            }
        };

        Ok(Leaderboard {
            period,
            period_start,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use ensemble_domain::XpGrant;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryXp {
        grants: Mutex<Vec<XpGrant>>,
    }

    #[async_trait]
    impl XpStore for MemoryXp {
        async fn record_grant(&self, grant: &XpGrant) -> Result<(), StoreError> {
            self.grants.lock().unwrap().push(grant.clone());
            Ok(())
        }

        async fn total_xp(&self, user_id: Uuid) -> Result<u64, StoreError> {
            Ok(self
                .grants
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.user_id == user_id)
                .map(|g| g.amount)
                .sum::<i64>()
                .max(0) as u64)
        }

        async fn all_totals(&self) -> Result<Vec<(Uuid, i64)>, StoreError> {
            let mut totals = std::collections::HashMap::new();
            for grant in self.grants.lock().unwrap().iter() {
                *totals.entry(grant.user_id).or_insert(0) += grant.amount;
            }
            Ok(totals.into_iter().collect())
        }

        async fn grants_since(&self, start: DateTime<Utc>) -> Result<Vec<XpGrant>, StoreError> {
            Ok(self
                .grants
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.granted_at >= start)
                .cloned()
                .collect())
        }

        async fn user_grants_since(
            &self,
            user_id: Uuid,
            start: DateTime<Utc>,
        ) -> Result<Vec<XpGrant>, StoreError> {
            Ok(self
                .grants
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.user_id == user_id && g.granted_at >= start)
                .cloned()
                .collect())
        }
    }

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn grant_at(user: Uuid, amount: i64, at: DateTime<Utc>) -> XpGrant {
        let mut grant = XpGrant::new(user, amount, "test");
        grant.granted_at = at;
        grant
    }

    #[tokio::test]
    async fn test_all_time_equals_cumulative_totals() {
        let store = Arc::new(MemoryXp::default());
        let old = Utc::now() - Duration::days(400);
        store
            .record_grant(&grant_at(uid(1), 500, old))
            .await
            .unwrap();
        store
            .record_grant(&grant_at(uid(1), 100, Utc::now()))
            .await
            .unwrap();
        store
            .record_grant(&grant_at(uid(2), 450, Utc::now()))
            .await
            .unwrap();

        let board = GetLeaderboardUseCase::new(store)
            .execute(Period::AllTime, DEFAULT_LIMIT)
            .await
            .unwrap();

        assert_eq!(board.entries[0].user_id, uid(1));
        assert_eq!(board.entries[0].score, 600);
        assert_eq!(board.entries[1].score, 450);
        assert!(board.period_start.is_none());
    }

    #[tokio::test]
    async fn test_weekly_counts_only_grants_in_period() {
        let store = Arc::new(MemoryXp::default());
        // Well outside any current week
        let stale = Utc::now() - Duration::days(30);
        store
            .record_grant(&grant_at(uid(1), 1000, stale))
            .await
            .unwrap();
        store
            .record_grant(&grant_at(uid(2), 50, Utc::now()))
            .await
            .unwrap();

        let board = GetLeaderboardUseCase::new(store)
            .execute(Period::Weekly, DEFAULT_LIMIT)
            .await
            .unwrap();

        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].user_id, uid(2));
        assert_eq!(board.entries[0].score, 50);
        assert!(board.period_start.is_some());
    }
}
