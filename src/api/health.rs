//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Session and service status
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub llm_model: String,
    pub tts_voice: String,
    /// Turns recorded in the current practice session, as of the last
    /// committed change while a chat is in flight
    pub turns: usize,
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Current model, voice and session size
async fn status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        llm_model: state.llm_model.clone(),
        tts_voice: state.tts_voice.clone(),
        turns: state.tutor.turn_count(),
    })
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build status router
pub fn status_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/status", get(status))
        .with_state(state)
}
