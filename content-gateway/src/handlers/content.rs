//! User-action handlers: generate, regenerate, originality check.
//!
//! Each handler performs at most one generation call and waits for the full
//! upstream response before answering. The session gate is consulted before
//! any upstream work; a denied action performs no call and mutates no
//! counter.

use crate::ratelimit::Decision;
use crate::services::providers::{rewrite_prompt, ProviderError, SearchMatch};
use crate::startup::AppState;
use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use chrono::Utc;
use gateway_core::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Header carrying the caller's session id.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Search matches shown to the user.
const MAX_MATCHES: usize = 5;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,

    /// When set, the generated text is also run through the search endpoint
    /// and the top matches are returned alongside it.
    #[serde(default)]
    pub check_originality: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub session_id: String,
    pub generated_text: String,
    pub requests_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<SearchMatch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub originality_error: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegenerateRequest {
    #[validate(length(min = 1, message = "Original text is required"))]
    pub original_text: String,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub session_id: String,
    pub generated_text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OriginalityRequest {
    #[validate(length(min = 1, message = "Query is required"))]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct OriginalityResponse {
    pub matches: Vec<SearchMatch>,
    pub original: bool,
}

/// Resolve the caller's session id, minting a fresh one when the header is
/// absent.
fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Map an upstream failure onto the app error taxonomy.
fn provider_error(err: ProviderError) -> AppError {
    match err {
        ProviderError::Network(msg) => {
            AppError::ServiceUnavailable(format!("Failed to connect to the API: {}", msg))
        }
        ProviderError::UpstreamStatus { .. } => AppError::BadGateway(err.to_string()),
        ProviderError::InvalidResponse(msg) => AppError::BadGateway(msg),
    }
}

fn too_many_requests(remaining_seconds: u64) -> AppError {
    AppError::TooManyRequests(
        format!(
            "Generation limit reached. Try again in {} seconds.",
            remaining_seconds
        ),
        Some(remaining_seconds),
    )
}

#[tracing::instrument(skip_all, fields(session_id, prompt_len = req.prompt.len()))]
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let session_id = session_id(&headers);
    tracing::Span::current().record("session_id", session_id.as_str());

    {
        let mut session = state.sessions.get_or_init(&session_id);
        if let Decision::Deny { remaining_seconds } = state.gate.check(&mut session, Utc::now()) {
            tracing::warn!(remaining_seconds, "Generation denied by session gate");
            return Err(too_many_requests(remaining_seconds));
        }
    }
    // The guard is dropped before the upstream call so a slow generation
    // does not hold the session shard lock.

    let generated = state
        .generator
        .generate(&req.prompt)
        .await
        .map_err(provider_error)?;

    let requests_used = {
        let mut session = state.sessions.get_or_init(&session_id);
        state.gate.record_success(&mut session, Utc::now());
        session.request_count
    };

    tracing::info!(requests_used, "Generation succeeded");

    let (matches, originality_error) = if req.check_originality {
        match state.searcher.search(&generated.text).await {
            Ok(mut matches) => {
                matches.truncate(MAX_MATCHES);
                (Some(matches), None)
            }
            // The content was already generated and counted; report the
            // failed check alongside it instead of failing the action.
            Err(e) => {
                tracing::warn!(error = %e, "Originality check failed");
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    Ok(Json(GenerateResponse {
        session_id,
        generated_text: generated.text,
        requests_used,
        matches,
        originality_error,
    }))
}

#[tracing::instrument(skip_all, fields(session_id, original_len = req.original_text.len()))]
pub async fn regenerate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RegenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let session_id = session_id(&headers);
    tracing::Span::current().record("session_id", session_id.as_str());

    if state.config.gate_regeneration {
        let mut session = state.sessions.get_or_init(&session_id);
        if let Decision::Deny { remaining_seconds } = state.gate.check(&mut session, Utc::now()) {
            tracing::warn!(remaining_seconds, "Regeneration denied by session gate");
            return Err(too_many_requests(remaining_seconds));
        }
    }

    let prompt = rewrite_prompt(&req.original_text);
    let generated = state
        .generator
        .generate(&prompt)
        .await
        .map_err(provider_error)?;

    if state.config.gate_regeneration {
        let mut session = state.sessions.get_or_init(&session_id);
        state.gate.record_success(&mut session, Utc::now());
    }

    tracing::info!("Regeneration succeeded");

    Ok(Json(RegenerateResponse {
        session_id,
        generated_text: generated.text,
    }))
}

#[tracing::instrument(skip_all, fields(query_len = req.query.len()))]
pub async fn originality(
    State(state): State<AppState>,
    Json(req): Json<OriginalityRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let mut matches = state
        .searcher
        .search(&req.query)
        .await
        .map_err(provider_error)?;
    matches.truncate(MAX_MATCHES);
    let original = matches.is_empty();

    tracing::info!(match_count = matches.len(), original, "Originality check done");

    Ok(Json(OriginalityResponse { matches, original }))
}
