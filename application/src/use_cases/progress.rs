//! Grant XP / Get Progress use cases
//!
//! Grants are validated and recorded through the `XpStore` port; the
//! progress summary derives level and per-day history from stored data.

use crate::ports::transcript_store::StoreError;
use crate::ports::xp_store::XpStore;
use chrono::{Duration, NaiveDate, Utc};
use ensemble_domain::{LevelProgress, XpGrant};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Days of per-day history included in a progress summary
const HISTORY_DAYS: i64 = 30;

#[derive(Error, Debug)]
pub enum GrantXpError {
    #[error("XP amount must be positive")]
    NonPositiveAmount,

    #[error("Grant reason cannot be empty")]
    EmptyReason,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// XP earned on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyXp {
    pub date: NaiveDate,
    pub xp_earned: i64,
}

/// A user's full progress summary
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub progress: LevelProgress,
    /// XP per day over the last 30 days, oldest first, gaps filled with 0
    pub history: Vec<DailyXp>,
}

/// Use case for recording an XP grant
pub struct GrantXpUseCase {
    xp: Arc<dyn XpStore>,
}

impl GrantXpUseCase {
    pub fn new(xp: Arc<dyn XpStore>) -> Self {
        Self { xp }
    }

    pub async fn execute(
        &self,
        user_id: Uuid,
        amount: i64,
        reason: &str,
    ) -> Result<XpGrant, GrantXpError> {
        if amount <= 0 {
            return Err(GrantXpError::NonPositiveAmount);
        }
        if reason.trim().is_empty() {
            return Err(GrantXpError::EmptyReason);
        }

        let grant = XpGrant::new(user_id, amount, reason.trim());
        self.xp.record_grant(&grant).await?;
        info!("Granted {} XP to {} ({})", amount, user_id, grant.reason);
        Ok(grant)
    }
}

/// Use case for a user's level and XP history
pub struct GetProgressUseCase {
    xp: Arc<dyn XpStore>,
}

impl GetProgressUseCase {
    pub fn new(xp: Arc<dyn XpStore>) -> Self {
        Self { xp }
    }

    pub async fn execute(&self, user_id: Uuid) -> Result<ProgressSummary, StoreError> {
        let total = self.xp.total_xp(user_id).await?;
        let progress = LevelProgress::from_total_xp(total);

        let today = Utc::now().date_naive();
        let start_date = today - Duration::days(HISTORY_DAYS - 1);
        let start = start_date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();
        let grants = self.xp.user_grants_since(user_id, start).await?;

        let mut per_day: std::collections::HashMap<NaiveDate, i64> =
            std::collections::HashMap::new();
        for grant in &grants {
            *per_day.entry(grant.granted_at.date_naive()).or_insert(0) += grant.amount;
        }

        let history = (0..HISTORY_DAYS)
            .map(|offset| {
                let date = start_date + Duration::days(offset);
                DailyXp {
                    date,
                    xp_earned: per_day.get(&date).copied().unwrap_or(0),
                }
            })
            .collect();

        Ok(ProgressSummary {
            user_id,
            progress,
            history,
        })
    }
}
