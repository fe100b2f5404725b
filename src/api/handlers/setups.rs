use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::db::rule_repo;
use crate::errors::AppError;
use crate::models::{NewSetup, Setup, SetupPatch};
use crate::session::Session;
use crate::AppState;

use super::ApiResponse;

pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<Setup>>>, AppError> {
    let user = session.require_user()?;
    let setups = rule_repo::get_setups(&state.db, user.id).await?;

    Ok(ApiResponse::ok(setups))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(mut body): Json<NewSetup>,
) -> Result<Json<ApiResponse<Setup>>, AppError> {
    let user = session.require_user()?;

    body.name = body.name.trim().to_string();
    if body.name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    let setup = rule_repo::create_setup(&state.db, user.id, &body).await?;
    Ok(ApiResponse::ok(setup))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SetupPatch>,
) -> Result<Json<ApiResponse<Setup>>, AppError> {
    let user = session.require_user()?;
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let setup = rule_repo::update_setup(&state.db, user.id, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("setup not found".into()))?;

    Ok(ApiResponse::ok(setup))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user = session.require_user()?;
    if !rule_repo::delete_setup(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("setup not found".into()));
    }

    Ok(ApiResponse::done())
}
