//! XP store port
//!
//! Persistence interface for XP grants and cumulative totals.

use super::transcript_store::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ensemble_domain::XpGrant;
use uuid::Uuid;

/// Persistence for XP grants and per-user cumulative totals
#[async_trait]
pub trait XpStore: Send + Sync {
    /// Record a grant and bump the user's cumulative total
    async fn record_grant(&self, grant: &XpGrant) -> Result<(), StoreError>;

    /// A user's cumulative total (0 if never granted)
    async fn total_xp(&self, user_id: Uuid) -> Result<u64, StoreError>;

    /// Every user's cumulative total
    async fn all_totals(&self) -> Result<Vec<(Uuid, i64)>, StoreError>;

    /// All grants with `granted_at >= start`, any user
    async fn grants_since(&self, start: DateTime<Utc>) -> Result<Vec<XpGrant>, StoreError>;

    /// One user's grants with `granted_at >= start`, newest first
    async fn user_grants_since(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
    ) -> Result<Vec<XpGrant>, StoreError>;
}
