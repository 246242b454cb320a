use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{ProblemSummary, TranscriptionConfig, TranscriptionResult, Urgency};
use crate::services::ai::terms::recommend_term;
use crate::services::classifier::analyze_problem;
use crate::state::AppState;

const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;
const MAX_TRANSCRIPT_CHARS: usize = 5000;

// POST /api/transcribe
#[derive(Deserialize)]
pub struct TranscribeRequest {
    pub audio_base64: String,
    pub mime_type: Option<String>,
    pub language: Option<String>,
}

pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranscribeRequest>,
) -> Result<Json<TranscriptionResult>, AppError> {
    let speech = state
        .speech
        .as_deref()
        .ok_or(AppError::Unavailable("speech-to-text"))?;

    let audio = base64::engine::general_purpose::STANDARD
        .decode(payload.audio_base64.trim())
        .map_err(|e| AppError::BadRequest(format!("audio is not valid base64: {e}")))?;
    if audio.is_empty() {
        return Err(AppError::BadRequest("audio is empty".to_string()));
    }
    if audio.len() > MAX_AUDIO_BYTES {
        return Err(AppError::BadRequest("audio exceeds 10 MB".to_string()));
    }

    let mut config = TranscriptionConfig::default();
    if let Some(language) = payload.language.filter(|l| !l.trim().is_empty()) {
        config.language = language;
    }
    let mime_type = payload.mime_type.as_deref().unwrap_or("audio/webm");

    tracing::info!(bytes = audio.len(), mime_type, "transcribing audio");

    let result = speech
        .transcribe(audio, mime_type, &config)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(result))
}

// POST /api/analyze
#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub transcript: String,
    pub urgency: Option<String>,
}

pub async fn analyze(Json(payload): Json<AnalyzeRequest>) -> Result<Json<ProblemSummary>, AppError> {
    let transcript = payload.transcript.trim();
    if transcript.is_empty() {
        return Err(AppError::BadRequest("transcript is required".to_string()));
    }
    if transcript.chars().count() > MAX_TRANSCRIPT_CHARS {
        return Err(AppError::BadRequest("transcript is too long".to_string()));
    }

    let mut summary = analyze_problem(transcript);
    if let Some(urgency) = payload.urgency.as_deref().and_then(Urgency::from_choice) {
        summary = summary.with_urgency(urgency);
    }

    tracing::info!(
        category = summary.category.as_str(),
        urgency = summary.urgency.as_str(),
        "problem analyzed"
    );

    Ok(Json(summary))
}

// POST /api/recommend-term
#[derive(Deserialize)]
pub struct RecommendRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub term: String,
}

pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let model = state
        .text_model
        .as_deref()
        .ok_or(AppError::Unavailable("term recommendation"))?;

    if payload.text.trim().is_empty() {
        return Err(AppError::BadRequest("text is required".to_string()));
    }

    let term = recommend_term(model, &payload.text)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(RecommendResponse {
        success: true,
        term,
    }))
}
