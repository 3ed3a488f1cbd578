//! HTTP error mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ensemble_application::use_cases::coach_turn::CoachTurnError;
use ensemble_application::use_cases::progress::GrantXpError;
use ensemble_application::use_cases::run_orchestration::RunOrchestrationError;
use ensemble_application::{GatewayError, StoreError};
use serde_json::json;

/// An error ready to be rendered as a JSON response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} -> {}", self.message, self.status);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<RunOrchestrationError> for ApiError {
    fn from(e: RunOrchestrationError) -> Self {
        match e {
            RunOrchestrationError::NoModels => ApiError::bad_request(e.to_string()),
        }
    }
}

impl From<CoachTurnError> for ApiError {
    fn from(e: CoachTurnError) -> Self {
        match e {
            CoachTurnError::SessionNotFound(_) => ApiError::not_found(e.to_string()),
            CoachTurnError::Gateway(inner) => inner.into(),
            CoachTurnError::Store(inner) => inner.into(),
        }
    }
}

impl From<GrantXpError> for ApiError {
    fn from(e: GrantXpError) -> Self {
        match e {
            GrantXpError::NonPositiveAmount | GrantXpError::EmptyReason => {
                ApiError::bad_request(e.to_string())
            }
            GrantXpError::Store(inner) => inner.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::not_found(e.to_string()),
            StoreError::Backend(_) => ApiError::internal(e.to_string()),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::MissingApiKey(_) => ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: e.to_string(),
            },
            _ => ApiError {
                status: StatusCode::BAD_GATEWAY,
                message: e.to_string(),
            },
        }
    }
}
