use std::time::Instant;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::instrument;

use flashcard_core::card::GenerationRequest;
use flashcard_orchestrator::pipeline::Pipeline;

/// Shared state for all HTTP handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            start_time: Instant::now(),
        }
    }
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate_flashcards", post(generate_flashcards))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

fn unprocessable(detail: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorDetail { detail })).into_response()
}

/// POST /generate_flashcards
///
/// Only request validation can fail; every pipeline failure is already folded into the response.
#[instrument(skip(state, body), fields(request_id = %uuid::Uuid::new_v4()))]
async fn generate_flashcards(
    State(state): State<AppState>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "generate_request_rejected");
            return unprocessable(rejection.body_text());
        }
    };

    if let Err(err) = request.validate_within(state.pipeline.settings().max_cards) {
        tracing::warn!(
            topic = %request.topic,
            count = request.count,
            error = %err,
            "generate_request_rejected"
        );
        return unprocessable(err.to_string());
    }

    tracing::info!(
        topic = %request.topic,
        count = request.count,
        has_notes = !request.notes.is_empty(),
        "generate_request_accepted"
    );
    let response = state.pipeline.generate_flashcards(&request).await;
    (StatusCode::OK, Json(response)).into_response()
}
