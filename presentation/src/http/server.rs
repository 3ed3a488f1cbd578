//! HTTP server setup and routing

use axum::routing::{get, post};
use axum::Router;
use ensemble_application::use_cases::coach_turn::CoachTurnUseCase;
use ensemble_application::use_cases::leaderboard::GetLeaderboardUseCase;
use ensemble_application::use_cases::progress::{GetProgressUseCase, GrantXpUseCase};
use ensemble_application::use_cases::run_orchestration::RunOrchestrationUseCase;
use ensemble_application::{CompletionGateway, TranscriptStore, XpStore};
use ensemble_domain::Model;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
///
/// Cloning is cheap; every field is an `Arc` or small value.
pub struct AppContext<G: CompletionGateway + 'static> {
    pub orchestration: Arc<RunOrchestrationUseCase<G>>,
    pub coach: Arc<CoachTurnUseCase<G>>,
    pub leaderboard: Arc<GetLeaderboardUseCase>,
    pub grant_xp: Arc<GrantXpUseCase>,
    pub progress: Arc<GetProgressUseCase>,
    pub transcripts: Arc<dyn TranscriptStore>,
    /// Models queried when an orchestration request names none
    pub default_models: Vec<Model>,
    /// Model used to synthesize fan-out responses
    pub synthesizer: Model,
}

impl<G: CompletionGateway + 'static> Clone for AppContext<G> {
    fn clone(&self) -> Self {
        Self {
            orchestration: Arc::clone(&self.orchestration),
            coach: Arc::clone(&self.coach),
            leaderboard: Arc::clone(&self.leaderboard),
            grant_xp: Arc::clone(&self.grant_xp),
            progress: Arc::clone(&self.progress),
            transcripts: Arc::clone(&self.transcripts),
            default_models: self.default_models.clone(),
            synthesizer: self.synthesizer.clone(),
        }
    }
}

impl<G: CompletionGateway + 'static> AppContext<G> {
    /// Wire the use cases from their dependencies
    pub fn new(
        gateway: Arc<G>,
        transcripts: Arc<dyn TranscriptStore>,
        xp: Arc<dyn XpStore>,
        default_models: Vec<Model>,
        synthesizer: Model,
        coach_model: Model,
    ) -> Self {
        Self {
            orchestration: Arc::new(RunOrchestrationUseCase::new(Arc::clone(&gateway))),
            coach: Arc::new(CoachTurnUseCase::new(
                gateway,
                Arc::clone(&transcripts),
                coach_model,
            )),
            leaderboard: Arc::new(GetLeaderboardUseCase::new(Arc::clone(&xp))),
            grant_xp: Arc::new(GrantXpUseCase::new(Arc::clone(&xp))),
            progress: Arc::new(GetProgressUseCase::new(xp)),
            transcripts,
            default_models,
            synthesizer,
        }
    }
}

/// Build the router with all routes
pub fn build_router<G: CompletionGateway + 'static>(ctx: AppContext<G>) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        .route("/api/orchestrate", post(super::handlers::orchestrate))
        .route("/api/coach", post(super::coach::coach_turn))
        .route("/api/templates", get(super::handlers::list_templates))
        .route("/api/templates", post(super::handlers::create_template))
        .route("/api/xp", post(super::handlers::grant_xp))
        .route("/api/leaderboard", get(super::handlers::leaderboard))
        .route("/api/progress/:user_id", get(super::handlers::progress))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped
pub async fn run<G: CompletionGateway + 'static>(
    bind_addr: &str,
    ctx: AppContext<G>,
) -> std::io::Result<()> {
    let app = build_router(ctx);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("HTTP server listening on {}", bind_addr);
    axum::serve(listener, app).await
}
