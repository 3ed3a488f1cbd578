//! SQLite-backed XP store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ensemble_application::ports::transcript_store::StoreError;
use ensemble_application::ports::xp_store::XpStore;
use ensemble_domain::XpGrant;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

pub struct SqliteXpStore {
    pool: Pool<Sqlite>,
}

impl SqliteXpStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn grant_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<XpGrant, StoreError> {
    let user_id: String = row.get("user_id");
    Ok(XpGrant {
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| StoreError::Backend(format!("bad uuid in row: {e}")))?,
        amount: row.get("amount"),
        reason: row.get("reason"),
        granted_at: row.get::<DateTime<Utc>, _>("granted_at"),
    })
}

#[async_trait]
impl XpStore for SqliteXpStore {
    async fn record_grant(&self, grant: &XpGrant) -> Result<(), StoreError> {
        // Grant row and running total move together
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query(
            "INSERT INTO xp_grants (user_id, amount, reason, granted_at) VALUES (?, ?, ?, ?)",
        )
        .bind(grant.user_id.to_string())
        .bind(grant.amount)
        .bind(&grant.reason)
        .bind(grant.granted_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        sqlx::query(
            "INSERT INTO xp_totals (user_id, total_xp) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET total_xp = total_xp + excluded.total_xp",
        )
        .bind(grant.user_id.to_string())
        .bind(grant.amount)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)
    }

    async fn total_xp(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT total_xp FROM xp_totals WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        Ok(total.unwrap_or(0).max(0) as u64)
    }

    async fn all_totals(&self) -> Result<Vec<(Uuid, i64)>, StoreError> {
        let rows = sqlx::query("SELECT user_id, total_xp FROM xp_totals")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.iter()
            .map(|row| {
                let user_id: String = row.get("user_id");
                let user_id = Uuid::parse_str(&user_id)
                    .map_err(|e| StoreError::Backend(format!("bad uuid in row: {e}")))?;
                Ok((user_id, row.get::<i64, _>("total_xp")))
            })
            .collect()
    }

    async fn grants_since(&self, start: DateTime<Utc>) -> Result<Vec<XpGrant>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, amount, reason, granted_at FROM xp_grants \
             WHERE granted_at >= ? ORDER BY granted_at DESC",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(grant_from_row).collect()
    }

    async fn user_grants_since(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
    ) -> Result<Vec<XpGrant>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, amount, reason, granted_at FROM xp_grants \
             WHERE user_id = ? AND granted_at >= ? ORDER BY granted_at DESC",
        )
        .bind(user_id.to_string())
        .bind(start)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(grant_from_row).collect()
    }
}
