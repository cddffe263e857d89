use super::state::AppState;
use crate::controller::CallSnapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

/// GET /call
/// Current call snapshot
pub async fn get_call(State(state): State<AppState>) -> Json<CallSnapshot> {
    Json(state.controller.snapshot())
}

/// GET /call/transcript
/// Transcript accumulated so far, as plain text
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, state.controller.transcript())
}

/// POST /call/start
/// Start a call; failures are reported in the returned snapshot's status
pub async fn start_call(State(state): State<AppState>) -> Json<CallSnapshot> {
    info!("Start requested over HTTP");
    state.controller.start().await;
    Json(state.controller.snapshot())
}

/// POST /call/stop
/// Stop the call; always leaves the call inactive
pub async fn stop_call(State(state): State<AppState>) -> Json<CallSnapshot> {
    info!("Stop requested over HTTP");
    state.controller.stop().await;
    Json(state.controller.snapshot())
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
