use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::db::rule_repo;
use crate::errors::AppError;
use crate::models::{NewRule, Rule, RulePatch};
use crate::session::Session;
use crate::AppState;

use super::ApiResponse;

/// GET /api/rules
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<Rule>>>, AppError> {
    let user = session.require_user()?;
    let rules = rule_repo::get_rules(&state.db, user.id).await?;

    Ok(ApiResponse::ok(rules))
}

/// POST /api/rules
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(mut body): Json<NewRule>,
) -> Result<Json<ApiResponse<Rule>>, AppError> {
    let user = session.require_user()?;

    body.title = body.title.trim().to_string();
    if body.title.is_empty() {
        return Err(AppError::BadRequest("title is required".into()));
    }

    let rule = rule_repo::create_rule(&state.db, user.id, &body).await?;
    Ok(ApiResponse::ok(rule))
}

/// PATCH /api/rules/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(mut patch): Json<RulePatch>,
) -> Result<Json<ApiResponse<Rule>>, AppError> {
    let user = session.require_user()?;

    if let Some(title) = patch.title.take() {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("title must not be empty".into()));
        }
        patch.title = Some(title);
    }

    let rule = rule_repo::update_rule(&state.db, user.id, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("rule not found".into()))?;

    Ok(ApiResponse::ok(rule))
}

/// POST /api/rules/{id}/toggle: flip the active flag
pub async fn toggle(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Rule>>, AppError> {
    let user = session.require_user()?;
    let rule = rule_repo::toggle_rule(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("rule not found".into()))?;

    Ok(ApiResponse::ok(rule))
}

/// DELETE /api/rules/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user = session.require_user()?;
    if !rule_repo::delete_rule(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("rule not found".into()));
    }

    Ok(ApiResponse::done())
}
