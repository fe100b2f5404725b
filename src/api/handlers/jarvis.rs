use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::jarvis::prompt::{build_system_prompt, trim_history};
use crate::jarvis::{get_context, ChatMessage, JarvisContext, LlmError};
use crate::session::Session;
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextQuery {
    pub canvas_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JarvisRequest {
    pub messages: Vec<ChatMessage>,
    /// Snapshot gathered by the caller; assembled here when absent.
    pub context: Option<JarvisContext>,
    /// The trader's own instructions, appended after the persona.
    pub system_prompt: Option<String>,
    pub active_canvas_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyText {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JarvisReply {
    pub content: Vec<ReplyText>,
}

/// Proxy failures, rendered as `{ "error": "..." }`.
#[derive(Debug)]
pub enum JarvisError {
    MissingApiKey,
    BadRequest(String),
    Provider(StatusCode),
}

impl IntoResponse for JarvisError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            JarvisError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OPENAI_API_KEY is not set".to_string(),
            ),
            JarvisError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            JarvisError::Provider(status) => {
                (status, "Failed to communicate with AI provider".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// GET /api/jarvis/context
pub async fn context(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ContextQuery>,
) -> Json<ApiResponse<JarvisContext>> {
    ApiResponse::ok(get_context(&state, &session, query.canvas_id).await)
}

/// POST /api/jarvis: one chat turn, forwarded to the LLM provider
pub async fn chat(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<JarvisRequest>, JsonRejection>,
) -> Result<Json<JarvisReply>, JarvisError> {
    let Json(body) = payload.map_err(|rejection| JarvisError::BadRequest(rejection.body_text()))?;
    let Some(llm) = state.llm.as_deref() else {
        return Err(JarvisError::MissingApiKey);
    };
    if body.messages.is_empty() {
        return Err(JarvisError::BadRequest("messages must not be empty".into()));
    }

    let context = match body.context {
        Some(ctx) => ctx,
        None => get_context(&state, &session, body.active_canvas_id).await,
    };
    let prompt = build_system_prompt(&context, body.system_prompt.as_deref());
    let history = trim_history(&body.messages);

    metrics::counter!("jarvis_requests_total").increment(1);
    let started = Instant::now();
    let result = llm.complete(&prompt, history).await;
    metrics::histogram!("jarvis_latency_seconds").record(started.elapsed().as_secs_f64());

    match result {
        Ok(text) => Ok(Json(JarvisReply {
            content: vec![ReplyText { text }],
        })),
        Err(e) => {
            metrics::counter!("jarvis_failures_total").increment(1);
            tracing::error!(error = %e, model = llm.model(), "Jarvis provider call failed");

            let status = match e {
                LlmError::Upstream { status, .. } => {
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                LlmError::Http(_) | LlmError::EmptyResponse => StatusCode::BAD_GATEWAY,
            };
            Err(JarvisError::Provider(status))
        }
    }
}
