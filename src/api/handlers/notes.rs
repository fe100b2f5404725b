use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewStockNote, StockNote, StockNotePatch};
use crate::session::Session;
use crate::storage::{notes, Backend};
use crate::AppState;

use super::ApiResponse;

/// GET /api/notes: every note, most recently edited first
pub async fn list_all(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<StockNote>>>, AppError> {
    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    Ok(ApiResponse::ok(notes::list_all(backend).await?))
}

/// GET /api/notes/{symbol}
pub async fn list_for_symbol(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Vec<StockNote>>>, AppError> {
    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    Ok(ApiResponse::ok(notes::list_for_symbol(backend, &symbol).await?))
}

/// POST /api/notes/{symbol}
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(symbol): Path<String>,
    Json(body): Json<NewStockNote>,
) -> Result<Json<ApiResponse<StockNote>>, AppError> {
    if symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }

    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    let note = notes::create(backend, &symbol, &body).await?;

    Ok(ApiResponse::ok(note))
}

/// PATCH /api/notes/{symbol}/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((symbol, id)): Path<(String, Uuid)>,
    Json(patch): Json<StockNotePatch>,
) -> Result<Json<ApiResponse<StockNote>>, AppError> {
    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    let note = notes::update(backend, &symbol, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("note not found".into()))?;

    Ok(ApiResponse::ok(note))
}

/// DELETE /api/notes/{symbol}/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((symbol, id)): Path<(String, Uuid)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    if !notes::delete(backend, &symbol, id).await? {
        return Err(AppError::NotFound("note not found".into()));
    }

    Ok(ApiResponse::done())
}
