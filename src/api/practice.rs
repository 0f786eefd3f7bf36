//! Practice endpoints: session start, spoken chat turns and translation hints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::Error;
use crate::reply::CorrectionNote;

/// Upper bound on uploaded recordings
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Multipart field carrying the recording
const AUDIO_FIELD: &str = "audio";

/// Build practice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/translate", post(translate))
        .route("/start", post(start))
        .route(
            "/chat",
            post(chat).layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES)),
        )
        .with_state(state)
}

/// Translation request
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub jp_text: String,
}

/// Translation response
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub en_text: String,
}

/// Suggest English phrasings for Japanese input
async fn translate(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, PracticeError> {
    let Json(request) = payload.map_err(|e| PracticeError::BadRequest(e.body_text()))?;

    let en_text = state.tutor.translate(&request.jp_text).await?;

    Ok(Json(TranslateResponse { en_text }))
}

/// Session start response
#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub text: String,
    /// Hex-encoded MP3
    pub audio_content: String,
}

/// Reset the session and greet the user
async fn start(State(state): State<Arc<ApiState>>) -> Result<Json<StartResponse>, PracticeError> {
    let opening = state.tutor.start().await?;

    Ok(Json(StartResponse {
        text: opening.text,
        audio_content: hex::encode(opening.audio),
    }))
}

/// Chat turn response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub user_text: String,
    pub ai_text: String,
    pub correction: CorrectionNote,
    /// Hex-encoded MP3
    pub audio_content: String,
}

/// Transcribe a recording, reply to it and correct it
///
/// Expects a multipart form with an `audio` field holding Opus-in-WebM at 48 kHz
async fn chat(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponse>, PracticeError> {
    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PracticeError::BadRequest(e.body_text()))?
    {
        if field.name() == Some(AUDIO_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| PracticeError::BadRequest(e.body_text()))?;
            audio = Some(bytes);
        }
    }

    let audio = audio.ok_or_else(|| {
        PracticeError::BadRequest(format!("missing multipart field `{AUDIO_FIELD}`"))
    })?;
    tracing::debug!(audio_bytes = audio.len(), "received recording");

    let exchange = state.tutor.chat(&audio).await?;

    Ok(Json(ChatResponse {
        user_text: exchange.user_text,
        ai_text: exchange.ai_text,
        correction: exchange.correction,
        audio_content: hex::encode(exchange.audio),
    }))
}

/// Practice API errors
#[derive(Debug)]
pub enum PracticeError {
    /// Malformed request shape
    BadRequest(String),
    /// Failure reported by the tutor
    Tutor(Error),
}

impl From<Error> for PracticeError {
    fn from(err: Error) -> Self {
        Self::Tutor(err)
    }
}

impl IntoResponse for PracticeError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Tutor(err) => {
                let (status, code) = match &err {
                    Error::Validation(_) => (StatusCode::BAD_REQUEST, "bad_request"),
                    Error::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                    Error::Stt(_) => (StatusCode::BAD_GATEWAY, "transcription_failed"),
                    Error::Llm(_) => (StatusCode::BAD_GATEWAY, "generation_failed"),
                    Error::Tts(_) => (StatusCode::BAD_GATEWAY, "synthesis_failed"),
                    Error::Http(_) => (StatusCode::BAD_GATEWAY, "upstream_unreachable"),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
                };
                (status, code, err.to_string())
            }
        };

        (status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
    }
}
