//! HTTP handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use moonlit_core::BackendError;

use crate::dto::{ChatRequest, ChatResponse, FrontendNotice, SpeechRequest, SpeechResponse};
use crate::error::HttpError;
use crate::llm::{LlmMessage, LlmRole};
use crate::state::AppState;

/// Shown to the user when the model service cannot be reached.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Could not reach the language model service \
(connection failure or timeout). Make sure Ollama is running and the model is loaded.";

/// Shown when the model answered with nothing.
pub const EMPTY_REPLY_MESSAGE: &str = "The language model returned an empty response.";

const TEXT_PREVIEW_CHARS: usize = 50;

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HttpError> {
    if request.prompt.trim().is_empty() {
        return Err(HttpError::BadRequest(
            "prompt must not be empty".to_string(),
        ));
    }

    let history = request.history.unwrap_or_default();
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(LlmMessage::new(LlmRole::System, state.persona.clone()));
    messages.extend(
        history
            .into_iter()
            .map(|entry| LlmMessage::new(LlmRole::from_history(&entry.role), entry.content)),
    );
    messages.push(LlmMessage::new(LlmRole::User, request.prompt));

    let model = state.llm.model_name().to_string();
    let started = Instant::now();
    let result = state.llm.chat(&messages).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(reply) => {
            tracing::info!(%model, elapsed_ms, turns = messages.len(), "Chat completed");
            Ok(Json(ChatResponse {
                response: Some(reply),
            }))
        }
        Err(BackendError::EmptyResponse { .. }) => {
            tracing::warn!(%model, elapsed_ms, "Language model returned an empty reply");
            Err(HttpError::Internal(EMPTY_REPLY_MESSAGE.to_string()))
        }
        Err(err) => {
            tracing::error!(%model, elapsed_ms, error = %err, "Language model request failed");
            Err(HttpError::Internal(UPSTREAM_FAILURE_MESSAGE.to_string()))
        }
    }
}

/// `POST /api/tts`
pub async fn tts(
    State(state): State<AppState>,
    Json(request): Json<SpeechRequest>,
) -> Result<Json<SpeechResponse>, HttpError> {
    let preview: String = request.text.chars().take(TEXT_PREVIEW_CHARS).collect();
    tracing::info!(voice = %request.voice_name, text = %preview, "Speech requested");

    let speech = state
        .speech
        .synthesize(&request.text, &request.voice_name)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Speech synthesis failed");
            HttpError::Internal("Speech synthesis failed.".to_string())
        })?;

    Ok(Json(SpeechResponse {
        audio_base64: Some(moonlit_voice::pcm::encode_base64(&speech.samples)),
        sample_rate: Some(speech.sample_rate),
    }))
}

/// `GET /health`
pub async fn health_check() -> &'static str {
    "OK"
}

/// Unknown path under `/api`.
pub async fn api_not_found(uri: Uri) -> HttpError {
    HttpError::NotFound(format!("no API route for {}", uri.path()))
}

/// Everything outside `/api`: the SPA entry point.
pub async fn spa_fallback(State(state): State<AppState>, method: Method) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    if let Some(dir) = &state.static_dir {
        let index = dir.join("index.html");
        match tokio::fs::read_to_string(&index).await {
            Ok(html) => return Html(html).into_response(),
            Err(e) => {
                tracing::warn!(path = %index.display(), error = %e, "index.html not available")
            }
        }
    }

    Json(FrontendNotice {
        message: "Frontend not built or index.html not found.".to_string(),
    })
    .into_response()
}
