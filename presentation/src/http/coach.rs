//! Interview coach SSE endpoint

use super::error::ApiError;
use super::server::AppContext;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use ensemble_application::use_cases::coach_turn::CoachTurnInput;
use ensemble_application::CompletionGateway;
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Deserialize, Default)]
pub struct CoachRequest {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    /// The candidate's message; absent on the opening turn
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /api/coach - one streamed coaching turn
///
/// Setup failures (unknown session, upstream connect) are rejected with
/// a JSON error before any SSE bytes are written. Once the stream is
/// open, failures arrive as an `error` event instead.
pub async fn coach_turn<G: CompletionGateway + 'static>(
    State(ctx): State<AppContext<G>>,
    Json(body): Json<CoachRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let input = CoachTurnInput {
        session_id: body.session_id,
        template_id: body.template_id,
        candidate_message: body.message.filter(|m| !m.trim().is_empty()),
    };

    let turn = ctx.coach.execute(input).await?;
    debug!("Coaching turn started for session {}", turn.session_id);

    let stream = ReceiverStream::new(turn.events)
        .map(|event| Ok(Event::default().event(event.name()).data(event.payload())));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
