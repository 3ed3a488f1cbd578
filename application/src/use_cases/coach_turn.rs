//! Coach Turn use case
//!
//! Runs one turn of an interview coaching session: persists the
//! candidate's message, opens a streaming completion upstream, and
//! relays it as `start` → `token`* → `close` | `error` events while
//! accumulating the full reply for persistence.
//!
//! Side effect ordering: the candidate turn is written before the
//! upstream call; the interviewer turn and usage totals are written only
//! after the upstream stream completes. A stream that aborts mid-way
//! persists nothing for the interviewer turn.

use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest, GatewayError};
use crate::ports::transcript_store::{StoreError, TranscriptStore};
use ensemble_domain::{
    ChatMessage, CoachEvent, Model, PromptTemplate, StreamEvent, TranscriptRole,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Transcript messages sent upstream per turn
const HISTORY_LIMIT: usize = 20;
/// Buffer between the relay task and the SSE writer
const EVENT_BUFFER: usize = 64;

/// Errors raised during turn setup, before any event is emitted
#[derive(Error, Debug)]
pub enum CoachTurnError {
    #[error("Coaching session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Input for one coaching turn
#[derive(Debug, Clone, Default)]
pub struct CoachTurnInput {
    /// Existing session to continue; a new one is created when absent
    pub session_id: Option<Uuid>,
    /// Template for a newly created session
    pub template_id: Option<Uuid>,
    /// The candidate's message; absent on the opening turn
    pub candidate_message: Option<String>,
}

/// A live coaching turn: the session it belongs to and its event stream
#[derive(Debug)]
pub struct CoachTurnStream {
    pub session_id: Uuid,
    pub events: mpsc::Receiver<CoachEvent>,
}

/// Use case for running one streamed coaching turn
pub struct CoachTurnUseCase<G: CompletionGateway + 'static> {
    gateway: Arc<G>,
    transcripts: Arc<dyn TranscriptStore>,
    coach_model: Model,
}

impl<G: CompletionGateway + 'static> CoachTurnUseCase<G> {
    pub fn new(gateway: Arc<G>, transcripts: Arc<dyn TranscriptStore>, coach_model: Model) -> Self {
        Self {
            gateway,
            transcripts,
            coach_model,
        }
    }

    /// Set up the turn and start relaying.
    ///
    /// Setup failures (unknown session, storage, upstream connect) are
    /// returned as errors so the HTTP layer can reject before streaming;
    /// failures after that surface as an `error` event on the stream.
    pub async fn execute(&self, input: CoachTurnInput) -> Result<CoachTurnStream, CoachTurnError> {
        let session = match input.session_id {
            Some(id) => self
                .transcripts
                .get_session(id)
                .await
                .map_err(|e| match e {
                    StoreError::NotFound(_) => CoachTurnError::SessionNotFound(id),
                    other => CoachTurnError::Store(other),
                })?,
            None => self.transcripts.create_session(input.template_id).await?,
        };

        let template = match session.template_id {
            Some(id) => self.transcripts.get_template(id).await.ok(),
            None => None,
        };

        // The candidate's turn is durable even if the upstream call
        // never produces a reply.
        if let Some(message) = input
            .candidate_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
        {
            self.transcripts
                .append_message(session.id, TranscriptRole::Candidate, message)
                .await?;
        }

        let history = self.transcripts.history(session.id, HISTORY_LIMIT).await?;
        let mut messages: Vec<ChatMessage> =
            history.iter().map(|m| m.to_chat_message()).collect();

        if input.candidate_message.is_none() {
            messages.push(ChatMessage::user(PromptTemplate::coach_opening()));
        }

        let request = CompletionRequest::new(messages)
            .with_system(PromptTemplate::coach_system(template.as_ref()))
            .with_temperature(0.8)
            .with_max_tokens(600);

        let upstream = self.gateway.stream(&self.coach_model, request).await?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let transcripts = Arc::clone(&self.transcripts);
        let session_id = session.id;

        tokio::spawn(async move {
            relay(upstream.receiver, tx, transcripts, session_id).await;
        });

        Ok(CoachTurnStream {
            session_id,
            events: rx,
        })
    }
}

/// Forward upstream events downstream, persisting the full turn at close.
async fn relay(
    mut upstream: mpsc::Receiver<StreamEvent>,
    tx: mpsc::Sender<CoachEvent>,
    transcripts: Arc<dyn TranscriptStore>,
    session_id: Uuid,
) {
    // A failed send means the client disconnected before the first
    // event; the drain loop below still runs so the turn is persisted.
    let _ = tx.send(CoachEvent::Start).await;

    let mut full_text = String::new();

    while let Some(event) = upstream.recv().await {
        match event {
            StreamEvent::Delta(chunk) => {
                if chunk.is_empty() {
                    continue;
                }
                full_text.push_str(&chunk);
                if tx.send(CoachEvent::Token { value: chunk }).await.is_err() {
                    // Client went away; keep draining so the turn can
                    // still be persisted when the stream completes.
                    continue;
                }
            }
            StreamEvent::Completed { usage } => {
                if let Err(e) = transcripts
                    .append_message(session_id, TranscriptRole::Interviewer, &full_text)
                    .await
                {
                    error!("Failed to persist interviewer turn: {}", e);
                }
                if let Some(usage) = usage {
                    if let Err(e) = transcripts.record_usage(session_id, usage).await {
                        warn!("Failed to record usage: {}", e);
                    }
                }
                info!("Coaching turn complete for session {}", session_id);
                let _ = tx.send(CoachEvent::Close { session_id }).await;
                return;
            }
            StreamEvent::Error(message) => {
                warn!("Upstream stream error: {}", message);
                let _ = tx.send(CoachEvent::Error { message }).await;
                return;
            }
        }
    }

    // Upstream channel closed without a terminal event
    let _ = tx
        .send(CoachEvent::Error {
            message: "upstream stream closed unexpectedly".to_string(),
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion_gateway::{Completion, StreamHandle};
    use async_trait::async_trait;
    use ensemble_domain::{CoachSession, InterviewTemplate, TokenUsage, TranscriptMessage};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Gateway whose stream() replays a script of events
    struct StreamingGateway {
        script: Vec<StreamEvent>,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl StreamingGateway {
        fn new(script: Vec<StreamEvent>) -> Self {
            Self {
                script,
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CompletionGateway for StreamingGateway {
        async fn complete(
            &self,
            _model: &Model,
            _request: CompletionRequest,
        ) -> Result<Completion, GatewayError> {
            unreachable!("coach turns always stream")
        }

        async fn stream(
            &self,
            _model: &Model,
            request: CompletionRequest,
        ) -> Result<StreamHandle, GatewayError> {
            *self.last_request.lock().unwrap() = Some(request);
            let (tx, rx) = mpsc::channel(16);
            let script = self.script.clone();
            tokio::spawn(async move {
                for event in script {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
            Ok(StreamHandle::new(rx))
        }
    }

    /// In-memory transcript store
    #[derive(Default)]
    struct MemoryStore {
        sessions: Mutex<HashMap<Uuid, CoachSession>>,
        messages: Mutex<Vec<TranscriptMessage>>,
        templates: Mutex<HashMap<Uuid, InterviewTemplate>>,
    }

    #[async_trait]
    impl TranscriptStore for MemoryStore {
        async fn create_session(
            &self,
            template_id: Option<Uuid>,
        ) -> Result<CoachSession, StoreError> {
            let session = CoachSession::new(template_id);
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id, session.clone());
            Ok(session)
        }

        async fn get_session(&self, session_id: Uuid) -> Result<CoachSession, StoreError> {
            self.sessions
                .lock()
                .unwrap()
                .get(&session_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
        }

        async fn append_message(
            &self,
            session_id: Uuid,
            role: TranscriptRole,
            content: &str,
        ) -> Result<TranscriptMessage, StoreError> {
            let message = TranscriptMessage::new(session_id, role, content);
            self.messages.lock().unwrap().push(message.clone());
            Ok(message)
        }

        async fn history(
            &self,
            session_id: Uuid,
            limit: usize,
        ) -> Result<Vec<TranscriptMessage>, StoreError> {
            let messages = self.messages.lock().unwrap();
            let mut history: Vec<TranscriptMessage> = messages
                .iter()
                .filter(|m| m.session_id == session_id)
                .cloned()
                .collect();
            if history.len() > limit {
                history = history.split_off(history.len() - limit);
            }
            Ok(history)
        }

        async fn record_usage(
            &self,
            session_id: Uuid,
            usage: TokenUsage,
        ) -> Result<(), StoreError> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions
                .get_mut(&session_id)
                .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;
            session.usage.input += usage.input;
            session.usage.output += usage.output;
            Ok(())
        }

        async fn create_template(
            &self,
            template: InterviewTemplate,
        ) -> Result<InterviewTemplate, StoreError> {
            self.templates
                .lock()
                .unwrap()
                .insert(template.id, template.clone());
            Ok(template)
        }

        async fn get_template(&self, template_id: Uuid) -> Result<InterviewTemplate, StoreError> {
            self.templates
                .lock()
                .unwrap()
                .get(&template_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(template_id.to_string()))
        }

        async fn list_templates(&self) -> Result<Vec<InterviewTemplate>, StoreError> {
            Ok(self.templates.lock().unwrap().values().cloned().collect())
        }
    }

    async fn collect_events(mut rx: mpsc::Receiver<CoachEvent>) -> Vec<CoachEvent> {
        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push(e);
        }
        events
    }

    #[tokio::test]
    async fn test_three_token_stream_relayed_and_persisted() {
        let gateway = Arc::new(StreamingGateway::new(vec![
            StreamEvent::Delta("Tell ".into()),
            StreamEvent::Delta("me ".into()),
            StreamEvent::Delta("more.".into()),
            StreamEvent::Completed {
                usage: Some(TokenUsage::new(42, 7)),
            },
        ]));
        let store = Arc::new(MemoryStore::default());
        let use_case =
            CoachTurnUseCase::new(gateway, store.clone(), Model::default_coach());

        let turn = use_case
            .execute(CoachTurnInput {
                candidate_message: Some("I optimized a slow query".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let session_id = turn.session_id;
        let events = collect_events(turn.events).await;

        assert_eq!(events.first(), Some(&CoachEvent::Start));
        let tokens: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                CoachEvent::Token { value } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(events.last(), Some(&CoachEvent::Close { session_id }));

        // The persisted interviewer turn equals the concatenated tokens
        let history = store.history(session_id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, TranscriptRole::Candidate);
        assert_eq!(history[1].role, TranscriptRole::Interviewer);
        assert_eq!(history[1].content, "Tell me more.");

        // Usage landed on the session
        let session = store.get_session(session_id).await.unwrap();
        assert_eq!(session.usage.total(), 49);
    }

    #[tokio::test]
    async fn test_turn_persisted_when_client_disconnects_immediately() {
        let gateway = Arc::new(StreamingGateway::new(vec![
            StreamEvent::Delta("Walk me ".into()),
            StreamEvent::Delta("through it.".into()),
            StreamEvent::Completed {
                usage: Some(TokenUsage::new(30, 5)),
            },
        ]));
        let store = Arc::new(MemoryStore::default());
        let use_case =
            CoachTurnUseCase::new(gateway, store.clone(), Model::default_coach());

        let turn = use_case
            .execute(CoachTurnInput {
                candidate_message: Some("I shipped a migration".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let session_id = turn.session_id;
        // Client goes away before consuming a single event.
        drop(turn.events);

        // The relay keeps draining upstream in the background, so the
        // interviewer turn shows up shortly after.
        let mut history = Vec::new();
        for _ in 0..50 {
            history = store.history(session_id, 10).await.unwrap();
            if history.len() == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, TranscriptRole::Interviewer);
        assert_eq!(history[1].content, "Walk me through it.");

        let session = store.get_session(session_id).await.unwrap();
        assert_eq!(session.usage.total(), 35);
    }

    #[tokio::test]
    async fn test_upstream_error_persists_nothing_for_assistant() {
        let gateway = Arc::new(StreamingGateway::new(vec![
            StreamEvent::Delta("par".into()),
            StreamEvent::Error("connection reset".into()),
        ]));
        let store = Arc::new(MemoryStore::default());
        let use_case =
            CoachTurnUseCase::new(gateway, store.clone(), Model::default_coach());

        let turn = use_case
            .execute(CoachTurnInput {
                candidate_message: Some("hello".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let session_id = turn.session_id;
        let events = collect_events(turn.events).await;

        assert!(matches!(events.last(), Some(CoachEvent::Error { .. })));

        // Candidate turn survives, interviewer turn was never written
        let history = store.history(session_id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, TranscriptRole::Candidate);
    }

    #[tokio::test]
    async fn test_unknown_session_rejected_before_streaming() {
        let gateway = Arc::new(StreamingGateway::new(vec![]));
        let store = Arc::new(MemoryStore::default());
        let use_case = CoachTurnUseCase::new(gateway, store, Model::default_coach());

        let missing = Uuid::new_v4();
        let err = use_case
            .execute(CoachTurnInput {
                session_id: Some(missing),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoachTurnError::SessionNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_opening_turn_sends_opening_instruction() {
        let gateway = Arc::new(StreamingGateway::new(vec![StreamEvent::Completed {
            usage: None,
        }]));
        let store = Arc::new(MemoryStore::default());
        let use_case =
            CoachTurnUseCase::new(gateway.clone(), store, Model::default_coach());

        let turn = use_case.execute(CoachTurnInput::default()).await.unwrap();
        let _ = collect_events(turn.events).await;

        let request = gateway.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.messages.len(), 1);
        assert!(request.messages[0]
            .content
            .contains("begin the interview"));
        assert!(request.system.unwrap().contains("interview coach"));
    }

    #[tokio::test]
    async fn test_template_context_reaches_system_prompt() {
        let gateway = Arc::new(StreamingGateway::new(vec![StreamEvent::Completed {
            usage: None,
        }]));
        let store = Arc::new(MemoryStore::default());
        let mut template = InterviewTemplate::new("Claims Systems Deep Dive");
        template.focus_area = Some("integration patterns".into());
        let template = store.create_template(template).await.unwrap();

        let use_case =
            CoachTurnUseCase::new(gateway.clone(), store, Model::default_coach());

        let turn = use_case
            .execute(CoachTurnInput {
                template_id: Some(template.id),
                ..Default::default()
            })
            .await
            .unwrap();
        let _ = collect_events(turn.events).await;

        let request = gateway.last_request.lock().unwrap().clone().unwrap();
        let system = request.system.unwrap();
        assert!(system.contains("Claims Systems Deep Dive"));
        assert!(system.contains("integration patterns"));
    }
}
