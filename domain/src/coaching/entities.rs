//! Interview coaching entities: sessions, templates and transcript messages

use crate::core::chat::{ChatMessage, TokenUsage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRole {
    /// The learner being interviewed
    Candidate,
    /// The AI coach
    Interviewer,
}

impl TranscriptRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptRole::Candidate => "candidate",
            TranscriptRole::Interviewer => "interviewer",
        }
    }
}

impl std::str::FromStr for TranscriptRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(TranscriptRole::Candidate),
            "interviewer" => Ok(TranscriptRole::Interviewer),
            other => Err(format!("unknown transcript role: {other}")),
        }
    }
}

/// One persisted turn of an interview transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: TranscriptRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl TranscriptMessage {
    pub fn new(session_id: Uuid, role: TranscriptRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Map a transcript message to the chat message the upstream API expects.
    ///
    /// Candidate turns become `user` messages, interviewer turns `assistant`.
    pub fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            TranscriptRole::Candidate => ChatMessage::user(self.content.clone()),
            TranscriptRole::Interviewer => ChatMessage::assistant(self.content.clone()),
        }
    }
}

/// An interview template a coaching session can be bound to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewTemplate {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_area: Option<String>,
}

impl InterviewTemplate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            persona: None,
            focus_area: None,
        }
    }
}

/// An interview coaching session (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachSession {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    /// Usage totals accumulated over completed turns
    pub usage: TokenUsage,
    pub created_at: DateTime<Utc>,
}

impl CoachSession {
    pub fn new(template_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id,
            usage: TokenUsage::default(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::ChatRole;

    #[test]
    fn test_role_roundtrip() {
        for role in [TranscriptRole::Candidate, TranscriptRole::Interviewer] {
            let parsed: TranscriptRole = role.as_str().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("observer".parse::<TranscriptRole>().is_err());
    }

    #[test]
    fn test_transcript_to_chat_mapping() {
        let session = CoachSession::new(None);
        let candidate = TranscriptMessage::new(session.id, TranscriptRole::Candidate, "hi");
        let interviewer = TranscriptMessage::new(session.id, TranscriptRole::Interviewer, "Q1?");

        assert_eq!(candidate.to_chat_message().role, ChatRole::User);
        assert_eq!(interviewer.to_chat_message().role, ChatRole::Assistant);
    }
}
