//! Axum route handlers for `/chat`.
//!
//! Per request: config check → auth check → validation → truncation →
//! prompt → provider tiers → response. Each step can end the request early.

use std::net::SocketAddr;

use axum::{
    extract::{rejection::BytesRejection, ConnectInfo, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderMap, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::classify::{into_app_error, FailureRecord, FailureStage};
use crate::chat::invoker::{invoke_with_fallback, Completion};
use crate::chat::prompts::build_prompt;
use crate::chat::truncation::truncate_docs;
use crate::chat::validation::{parse_chat_body, ChatRequest};
use crate::errors::AppError;
use crate::state::AppState;
use crate::usage::store::{record_prompt_usage, NewPromptUsage};

pub const API_KEY_HEADER: &str = "x-api-key";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Characters of the question shown in the request log line.
const QUESTION_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /chat
///
/// Answers `question` from the caller-supplied `docs`.
pub async fn handle_chat(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let llm = state.llm.as_deref().ok_or(AppError::Misconfigured)?;

    if !api_key_matches(state.config.api_key.as_deref(), &headers) {
        return Err(AppError::Unauthorized);
    }

    let body = body?;
    let request = parse_chat_body(&body, state.config.limits.max_question_length).map_err(
        |detail| {
            into_app_error(
                FailureRecord::new(FailureStage::Validation, detail),
                state.config.run_mode,
            )
        },
    )?;

    let caller_ip = caller_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    info!(
        timestamp = %Utc::now().to_rfc3339(),
        caller = caller_ip.as_deref().unwrap_or("unknown"),
        "Chat request: \"{}\"",
        question_preview(&request.question)
    );

    let docs = truncate_docs(&request.docs, state.config.limits.max_docs_length);
    let prompt = build_prompt(&request.question, &docs);
    debug!(
        "Prompt built: docs {} → {} chars, user message {} chars",
        request.docs.chars().count(),
        docs.chars().count(),
        prompt.user().chars().count()
    );

    let completion = invoke_with_fallback(llm, &state.model_tiers, &prompt)
        .await
        .map_err(|failure| into_app_error(failure, state.config.run_mode))?;

    record_usage(&state, &request, &completion, caller_ip.as_deref()).await;

    Ok(Json(ChatResponse {
        answer: completion.answer,
    }))
}

/// OPTIONS /chat
pub async fn handle_chat_preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, x-api-key"),
        ],
    )
}

/// Any other verb on /chat.
pub async fn handle_chat_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// With no key configured every caller is allowed.
fn api_key_matches(expected: Option<&str>, headers: &HeaderMap) -> bool {
    match expected {
        None => true,
        Some(expected) => {
            headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                == Some(expected)
        }
    }
}

/// Ids that are not UUIDs are dropped rather than failing the usage row.
fn usage_project_id(project_id: Option<&str>) -> Option<Uuid> {
    project_id.and_then(|id| Uuid::parse_str(id).ok())
}

/// First `x-forwarded-for` hop, else the socket peer.
fn caller_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

fn question_preview(question: &str) -> String {
    match question.char_indices().nth(QUESTION_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &question[..cut]),
        None => question.to_string(),
    }
}

/// Best effort: a failed insert is logged and never changes the response.
async fn record_usage(
    state: &AppState,
    request: &ChatRequest,
    completion: &Completion,
    caller_ip: Option<&str>,
) {
    let Some(db) = &state.db else {
        return;
    };

    let usage = NewPromptUsage {
        project_id: usage_project_id(request.project_id.as_deref()),
        question: &request.question,
        response_length: i32::try_from(completion.answer.chars().count()).unwrap_or(i32::MAX),
        model_used: &completion.model,
        tokens_used: i32::try_from(completion.tokens_used).unwrap_or(i32::MAX),
        ip_address: caller_ip,
    };

    if let Err(e) = record_prompt_usage(db, &usage).await {
        warn!("Failed to record prompt usage: {e}");
    }
}
