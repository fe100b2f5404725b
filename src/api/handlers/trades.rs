use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{journal_repo, trade_repo};
use crate::errors::AppError;
use crate::importer::{self, ImportReport};
use crate::models::{normalize_symbol, JournalEntry, NewTrade, Trade, TradePatch};
use crate::session::Session;
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct TradeQuery {
    pub symbol: Option<String>,
}

/// GET /api/trades: newest first, optionally `?symbol=`
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<TradeQuery>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    let user = session.require_user()?;
    let symbol = query
        .symbol
        .as_deref()
        .map(normalize_symbol)
        .filter(|s| !s.is_empty());

    let trades = trade_repo::get_trades(&state.db, user.id, symbol.as_deref()).await?;
    Ok(ApiResponse::ok(trades))
}

/// GET /api/trades/{id}
pub async fn detail(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    let user = session.require_user()?;
    let trade = trade_repo::get_trade_by_id(&state.db, user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    Ok(ApiResponse::ok(trade))
}

/// POST /api/trades: log a trade manually
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(mut body): Json<NewTrade>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    let user = session.require_user()?;

    body.symbol = normalize_symbol(&body.symbol);
    if body.symbol.is_empty() {
        return Err(AppError::BadRequest("symbol is required".into()));
    }
    if body.quantity <= Decimal::ZERO {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }
    if body.price < Decimal::ZERO || body.fee < Decimal::ZERO {
        return Err(AppError::BadRequest("price and fee must not be negative".into()));
    }

    let trade = trade_repo::insert_trade(&state.db, user.id, &body).await?;
    tracing::info!(owner = %user.id, trade = %trade.id, symbol = %trade.symbol, "Trade logged");

    Ok(ApiResponse::ok(trade))
}

/// PATCH /api/trades/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(mut patch): Json<TradePatch>,
) -> Result<Json<ApiResponse<Trade>>, AppError> {
    let user = session.require_user()?;
    patch.symbol = patch.symbol.as_deref().map(normalize_symbol);

    let trade = trade_repo::update_trade(&state.db, user.id, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("trade not found".into()))?;

    Ok(ApiResponse::ok(trade))
}

/// DELETE /api/trades/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user = session.require_user()?;
    if !trade_repo::delete_trade(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("trade not found".into()));
    }

    Ok(ApiResponse::done())
}

/// GET /api/trades/{id}/journal: journal entries linked to a trade
pub async fn journal(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<JournalEntry>>>, AppError> {
    let user = session.require_user()?;
    let entries = journal_repo::get_entries_for_trade(&state.db, user.id, id).await?;

    Ok(ApiResponse::ok(entries))
}

/// POST /api/import/trades: body is the raw broker CSV export
pub async fn import(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    body: String,
) -> Result<Json<ApiResponse<ImportReport>>, AppError> {
    let user = session.require_user()?;

    let parsed = importer::parse_broker_csv(&body);
    if parsed.trades.is_empty() {
        return Err(AppError::BadRequest("No valid trades found in CSV.".into()));
    }

    let report = importer::import_trades(&state.db, user.id, parsed).await;
    Ok(ApiResponse::ok(report))
}
