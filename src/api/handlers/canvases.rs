use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::db::{canvas_repo, user_repo};
use crate::errors::AppError;
use crate::models::{Canvas, CanvasPatch, CommunityCanvas, NewCanvas};
use crate::services::canvas_gallery::{self, COMMUNITY_LIMIT};
use crate::session::{AuthUser, Session};
use crate::AppState;

use super::ApiResponse;

/// Keep the profile mirror current so gallery listings can name the author.
async fn touch_profile(state: &AppState, user: &AuthUser) {
    if let Err(e) = user_repo::ensure_user(&state.db, user.id, user.email.as_deref()).await {
        tracing::warn!(error = %e, owner = %user.id, "Failed to refresh user profile");
    }
}

/// GET /api/canvases: own canvases, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<Canvas>>>, AppError> {
    let user = session.require_user()?;
    let canvases = canvas_repo::get_user_canvases(&state.db, user.id).await?;

    Ok(ApiResponse::ok(canvases))
}

/// GET /api/canvases/{id}: own canvas, or anyone's public one
pub async fn detail(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Canvas>>, AppError> {
    let viewer = session.owner();
    let canvas = canvas_repo::get_canvas_by_id(&state.db, id)
        .await?
        .filter(|c| c.is_public || Some(c.user_id) == viewer)
        .ok_or_else(|| AppError::NotFound("canvas not found".into()))?;

    Ok(ApiResponse::ok(canvas))
}

/// POST /api/canvases: save a new named canvas
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(mut body): Json<NewCanvas>,
) -> Result<Json<ApiResponse<Canvas>>, AppError> {
    let user = session.require_user()?;

    body.name = body.name.trim().to_string();
    if body.name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    touch_profile(&state, user).await;
    let canvas = canvas_repo::create_canvas(&state.db, user.id, &body).await?;
    tracing::info!(owner = %user.id, canvas = %canvas.id, public = canvas.is_public, "Canvas saved");

    Ok(ApiResponse::ok(canvas))
}

/// PATCH /api/canvases/{id}: overwrite the given fields, last writer wins
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CanvasPatch>,
) -> Result<Json<ApiResponse<Canvas>>, AppError> {
    let user = session.require_user()?;
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let canvas = canvas_repo::update_canvas(&state.db, user.id, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("canvas not found".into()))?;

    if patch.is_default == Some(true) {
        canvas_repo::clear_other_defaults(&state.db, user.id, canvas.id).await?;
    }

    Ok(ApiResponse::ok(canvas))
}

/// DELETE /api/canvases/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user = session.require_user()?;
    if !canvas_repo::delete_canvas(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("canvas not found".into()));
    }

    Ok(ApiResponse::done())
}

/// POST /api/canvases/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Canvas>>, AppError> {
    let user = session.require_user()?;
    touch_profile(&state, user).await;

    let canvas = canvas_repo::set_public(&state.db, user.id, id, true)
        .await?
        .ok_or_else(|| AppError::NotFound("canvas not found".into()))?;

    Ok(ApiResponse::ok(canvas))
}

/// POST /api/canvases/{id}/unpublish: likes and metadata stay
pub async fn unpublish(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Canvas>>, AppError> {
    let user = session.require_user()?;
    let canvas = canvas_repo::set_public(&state.db, user.id, id, false)
        .await?
        .ok_or_else(|| AppError::NotFound("canvas not found".into()))?;

    Ok(ApiResponse::ok(canvas))
}

/// POST /api/canvases/{id}/import: private copy of a community canvas
pub async fn import(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Canvas>>, AppError> {
    let user = session.require_user()?;
    let canvas = canvas_gallery::import_canvas(&state.db, user.id, id).await?;

    Ok(ApiResponse::ok(canvas))
}

/// POST /api/canvases/{id}/like
pub async fn like(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Canvas>>, AppError> {
    session.require_user()?;
    let canvas = canvas_repo::like_canvas(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("canvas not found".into()))?;

    Ok(ApiResponse::ok(canvas))
}

/// GET /api/community/canvases: public canvases by likes
pub async fn community(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CommunityCanvas>>>, AppError> {
    let canvases = canvas_repo::get_community_canvases(&state.db, COMMUNITY_LIMIT).await?;

    Ok(ApiResponse::ok(canvases))
}
