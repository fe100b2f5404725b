use axum::extract::State;
use axum::{Extension, Json};
use serde_json::Value;

use crate::db::user_repo;
use crate::errors::AppError;
use crate::session::Session;
use crate::AppState;

use super::ApiResponse;

/// GET /api/me/settings
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let user = session.require_user()?;
    let settings = user_repo::get_settings(&state.db, user.id).await?;

    Ok(ApiResponse::ok(settings))
}

/// PUT /api/me/settings: shallow merge into the stored settings object
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let user = session.require_user()?;
    if !body.is_object() {
        return Err(AppError::BadRequest("settings must be a JSON object".into()));
    }

    let settings =
        user_repo::merge_settings(&state.db, user.id, user.email.as_deref(), &body).await?;
    tracing::info!(owner = %user.id, "Settings updated");

    Ok(ApiResponse::ok(settings))
}
