use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{normalize_symbol, WatchlistItem, WatchlistPatch};
use crate::session::Session;
use crate::storage::{watchlist, Backend};
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct AddSymbolRequest {
    pub symbol: String,
}

/// GET /api/watchlist: account or device list, by display order
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<WatchlistItem>>>, AppError> {
    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    let items = watchlist::list(backend).await?;

    Ok(ApiResponse::ok(items))
}

/// POST /api/watchlist: adding a watched symbol returns the existing item
pub async fn add(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<AddSymbolRequest>,
) -> Result<Json<ApiResponse<WatchlistItem>>, AppError> {
    if normalize_symbol(&body.symbol).is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }

    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    let item = watchlist::add(backend, &body.symbol).await?;

    Ok(ApiResponse::ok(item))
}

/// PATCH /api/watchlist/{symbol}
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(symbol): Path<String>,
    Json(patch): Json<WatchlistPatch>,
) -> Result<Json<ApiResponse<WatchlistItem>>, AppError> {
    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    let item = watchlist::update(backend, &symbol, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} is not on the watchlist", normalize_symbol(&symbol))))?;

    Ok(ApiResponse::ok(item))
}

/// DELETE /api/watchlist/{symbol}
pub async fn remove(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let backend = Backend::select(&state.db, &state.device_store, &session)?;
    if !watchlist::remove(backend, &symbol).await? {
        return Err(AppError::NotFound(format!(
            "{} is not on the watchlist",
            normalize_symbol(&symbol)
        )));
    }

    Ok(ApiResponse::done())
}
