//! SQLite-backed transcript store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ensemble_application::ports::transcript_store::{StoreError, TranscriptStore};
use ensemble_domain::{
    CoachSession, InterviewTemplate, TokenUsage, TranscriptMessage, TranscriptRole,
};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

pub struct SqliteTranscriptStore {
    pool: Pool<Sqlite>,
}

impl SqliteTranscriptStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Backend(format!("bad uuid in row: {e}")))
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TranscriptMessage, StoreError> {
    let role: String = row.get("role");
    Ok(TranscriptMessage {
        id: parse_uuid(row.get::<&str, _>("id"))?,
        session_id: parse_uuid(row.get::<&str, _>("session_id"))?,
        role: role.parse::<TranscriptRole>().map_err(StoreError::Backend)?,
        content: row.get("content"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

fn template_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<InterviewTemplate, StoreError> {
    Ok(InterviewTemplate {
        id: parse_uuid(row.get::<&str, _>("id"))?,
        title: row.get("title"),
        description: row.get("description"),
        persona: row.get("persona"),
        focus_area: row.get("focus_area"),
    })
}

#[async_trait]
impl TranscriptStore for SqliteTranscriptStore {
    async fn create_session(&self, template_id: Option<Uuid>) -> Result<CoachSession, StoreError> {
        let session = CoachSession::new(template_id);
        sqlx::query(
            "INSERT INTO coach_sessions (id, template_id, input_tokens, output_tokens, created_at) \
             VALUES (?, ?, 0, 0, ?)",
        )
        .bind(session.id.to_string())
        .bind(session.template_id.map(|id| id.to_string()))
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(session)
    }

    async fn get_session(&self, session_id: Uuid) -> Result<CoachSession, StoreError> {
        let row = sqlx::query(
            "SELECT id, template_id, input_tokens, output_tokens, created_at \
             FROM coach_sessions WHERE id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound(format!("session {session_id}")))?;

        let template_id = row
            .get::<Option<String>, _>("template_id")
            .map(|raw| parse_uuid(&raw))
            .transpose()?;
        Ok(CoachSession {
            id: parse_uuid(row.get::<&str, _>("id"))?,
            template_id,
            usage: TokenUsage::new(
                row.get::<i64, _>("input_tokens") as u32,
                row.get::<i64, _>("output_tokens") as u32,
            ),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        })
    }

    async fn append_message(
        &self,
        session_id: Uuid,
        role: TranscriptRole,
        content: &str,
    ) -> Result<TranscriptMessage, StoreError> {
        let message = TranscriptMessage::new(session_id, role, content);
        sqlx::query(
            "INSERT INTO transcript_messages (id, session_id, role, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(message)
    }

    async fn history(
        &self,
        session_id: Uuid,
        limit: usize,
    ) -> Result<Vec<TranscriptMessage>, StoreError> {
        // Newest `limit` rows, then reversed so the caller sees them in
        // conversation order. rowid breaks created_at ties.
        let rows = sqlx::query(
            "SELECT id, session_id, role, content, created_at \
             FROM transcript_messages WHERE session_id = ? \
             ORDER BY rowid DESC LIMIT ?",
        )
        .bind(session_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut messages = rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    async fn record_usage(&self, session_id: Uuid, usage: TokenUsage) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE coach_sessions \
             SET input_tokens = input_tokens + ?, output_tokens = output_tokens + ? \
             WHERE id = ?",
        )
        .bind(usage.input as i64)
        .bind(usage.output as i64)
        .bind(session_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("session {session_id}")));
        }
        Ok(())
    }

    async fn create_template(
        &self,
        template: InterviewTemplate,
    ) -> Result<InterviewTemplate, StoreError> {
        sqlx::query(
            "INSERT INTO interview_templates (id, title, description, persona, focus_area) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(template.id.to_string())
        .bind(&template.title)
        .bind(&template.description)
        .bind(&template.persona)
        .bind(&template.focus_area)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(template)
    }

    async fn get_template(&self, template_id: Uuid) -> Result<InterviewTemplate, StoreError> {
        let row = sqlx::query(
            "SELECT id, title, description, persona, focus_area \
             FROM interview_templates WHERE id = ?",
        )
        .bind(template_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound(format!("template {template_id}")))?;
        template_from_row(&row)
    }

    async fn list_templates(&self) -> Result<Vec<InterviewTemplate>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, title, description, persona, focus_area \
             FROM interview_templates ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(template_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::init_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn store() -> SqliteTranscriptStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        SqliteTranscriptStore::new(pool)
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let store = store().await;
        let created = store.create_session(None).await.unwrap();
        let loaded = store.get_session(created.id).await.unwrap();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.template_id, None);
        assert_eq!(loaded.usage.total(), 0);
    }

    #[tokio::test]
    async fn test_get_unknown_session_is_not_found() {
        let store = store().await;
        let err = store.get_session(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_returns_recent_messages_oldest_first() {
        let store = store().await;
        let session = store.create_session(None).await.unwrap();
        for i in 0..5 {
            store
                .append_message(session.id, TranscriptRole::Candidate, &format!("m{i}"))
                .await
                .unwrap();
        }

        let history = store.history(session.id, 3).await.unwrap();
        let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_record_usage_accumulates() {
        let store = store().await;
        let session = store.create_session(None).await.unwrap();
        store
            .record_usage(session.id, TokenUsage::new(10, 20))
            .await
            .unwrap();
        store
            .record_usage(session.id, TokenUsage::new(5, 5))
            .await
            .unwrap();

        let loaded = store.get_session(session.id).await.unwrap();
        assert_eq!(loaded.usage, TokenUsage::new(15, 25));
    }

    #[tokio::test]
    async fn test_record_usage_for_unknown_session_is_not_found() {
        let store = store().await;
        let err = store
            .record_usage(Uuid::new_v4(), TokenUsage::new(1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_template_round_trip_and_session_binding() {
        let store = store().await;
        let mut template = InterviewTemplate::new("Systems design");
        template.persona = Some("Staff engineer".to_string());
        let template = store.create_template(template).await.unwrap();

        let session = store.create_session(Some(template.id)).await.unwrap();
        let loaded = store.get_session(session.id).await.unwrap();
        assert_eq!(loaded.template_id, Some(template.id));

        let listed = store.list_templates().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].persona.as_deref(), Some("Staff engineer"));
    }
}
