//! JSON request handlers

use super::error::ApiError;
use super::server::AppContext;
use axum::Json;
use axum::extract::{Path, Query as QueryParams, State};
use axum::http::StatusCode;
use ensemble_application::CompletionGateway;
use ensemble_application::use_cases::leaderboard::{DEFAULT_LIMIT, Leaderboard};
use ensemble_application::use_cases::progress::ProgressSummary;
use ensemble_application::use_cases::run_orchestration::RunOrchestrationInput;
use ensemble_domain::{
    InterviewTemplate, Model, OrchestrationOutcome, Period, Query, XpGrant,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "ensemble",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

// ==================== Orchestration ====================

#[derive(Debug, Deserialize)]
pub struct OrchestrateRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<String>,
    /// Model ids; the configured defaults apply when absent
    #[serde(default)]
    pub models: Option<Vec<String>>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub synthesize: bool,
}

/// POST /api/orchestrate
pub async fn orchestrate<G: CompletionGateway + 'static>(
    State(ctx): State<AppContext<G>>,
    Json(body): Json<OrchestrateRequest>,
) -> Result<Json<OrchestrationOutcome>, ApiError> {
    let query = Query::try_new(body.query)
        .ok_or_else(|| ApiError::bad_request("query cannot be empty"))?;

    let models: Vec<Model> = match body.models {
        Some(names) => {
            if names.is_empty() {
                return Err(ApiError::bad_request("models cannot be an empty list"));
            }
            names
                .iter()
                .map(|n| {
                    if n.trim().is_empty() {
                        Err(ApiError::bad_request("model name cannot be empty"))
                    } else {
                        Ok(n.parse().unwrap_or_else(|_| Model::Custom(n.clone())))
                    }
                })
                .collect::<Result<_, _>>()?
        }
        None => ctx.default_models.clone(),
    };

    let mut input = RunOrchestrationInput::new(query, models)
        .with_synthesizer(ctx.synthesizer.clone());
    if let Some(context) = body.context {
        input = input.with_context(context);
    }
    if let Some(temperature) = body.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ApiError::bad_request(
                "temperature must be between 0.0 and 2.0",
            ));
        }
        input = input.with_temperature(temperature);
    }
    if body.synthesize {
        input = input.with_synthesis();
    }

    let outcome = ctx.orchestration.execute(input).await?;
    Ok(Json(outcome))
}

// ==================== Interview templates ====================

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub focus_area: Option<String>,
}

/// POST /api/templates
pub async fn create_template<G: CompletionGateway + 'static>(
    State(ctx): State<AppContext<G>>,
    Json(body): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<InterviewTemplate>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request("title cannot be empty"));
    }

    let mut template = InterviewTemplate::new(body.title.trim());
    template.description = body.description;
    template.persona = body.persona;
    template.focus_area = body.focus_area;

    let created = ctx.transcripts.create_template(template).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/templates
pub async fn list_templates<G: CompletionGateway + 'static>(
    State(ctx): State<AppContext<G>>,
) -> Result<Json<Vec<InterviewTemplate>>, ApiError> {
    Ok(Json(ctx.transcripts.list_templates().await?))
}

// ==================== Gamification ====================

#[derive(Debug, Deserialize)]
pub struct GrantXpRequest {
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: String,
}

/// POST /api/xp
pub async fn grant_xp<G: CompletionGateway + 'static>(
    State(ctx): State<AppContext<G>>,
    Json(body): Json<GrantXpRequest>,
) -> Result<(StatusCode, Json<XpGrant>), ApiError> {
    let grant = ctx
        .grant_xp
        .execute(body.user_id, body.amount, &body.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(grant)))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// GET /api/leaderboard
pub async fn leaderboard<G: CompletionGateway + 'static>(
    State(ctx): State<AppContext<G>>,
    QueryParams(params): QueryParams<LeaderboardParams>,
) -> Result<Json<Leaderboard>, ApiError> {
    let period = match params.period.as_deref() {
        Some(raw) => raw
            .parse::<Period>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => Period::AllTime,
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let board = ctx.leaderboard.execute(period, limit).await?;
    Ok(Json(board))
}

/// GET /api/progress/:user_id
pub async fn progress<G: CompletionGateway + 'static>(
    State(ctx): State<AppContext<G>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProgressSummary>, ApiError> {
    Ok(Json(ctx.progress.execute(user_id).await?))
}
