//! HTTP surface of ragchat.
//!
//! One operation, `GET|POST /api/main`, plus a liveness probe. Errors are
//! mapped to status codes here and nowhere else.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ragchat_core::AppError;
use ragchat_knowledge::{ask, question_from_request, AnswerPayload, RagSettings, SearchClient};
use ragchat_llm::LlmClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared, read-only handles used by every request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RagSettings>,
    pub search: Arc<dyn SearchClient>,
    pub llm: Arc<dyn LlmClient>,
}

/// Query string of the ask operation.
#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub question: Option<String>,
}

/// Error body: `{"error": "<Kind>: <detail>"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper turning an [`AppError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::warn!(error = %self.0, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/main", get(ask_handler).post(ask_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[tracing::instrument(skip_all)]
async fn ask_handler(
    State(state): State<AppState>,
    params: Option<Query<AskParams>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AnswerPayload>, ApiError> {
    let body = body.map_err(|rejection| {
        AppError::BadRequest(format!("request body could not be read ({})", rejection.body_text()))
    })?;
    let query_question = params.as_ref().and_then(|p| p.question.as_deref());
    let question = question_from_request(&body, query_question)?;

    let payload = ask(
        &question,
        &state.settings,
        state.search.as_ref(),
        state.llm.as_ref(),
    )
    .await?;

    tracing::info!(sources_count = payload.sources.len(), "Question answered");
    Ok(Json(payload))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
