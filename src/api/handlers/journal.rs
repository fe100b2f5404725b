use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::db::journal_repo;
use crate::errors::{is_unique_violation, AppError};
use crate::models::journal::serialize_content;
use crate::models::{JournalEntry, JournalPatch, NewJournalEntry};
use crate::session::Session;
use crate::AppState;

use super::ApiResponse;

#[derive(Deserialize)]
pub struct DaySaveRequest {
    #[serde(default)]
    pub content: Value,
    pub mood_score: Option<i32>,
}

#[derive(Deserialize)]
pub struct DraftRequest {
    #[serde(default)]
    pub content: Value,
}

/// GET /api/journal: newest day first
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApiResponse<Vec<JournalEntry>>>, AppError> {
    let user = session.require_user()?;
    let entries = journal_repo::get_entries(&state.db, user.id).await?;

    Ok(ApiResponse::ok(entries))
}

/// POST /api/journal: one entry per day; a second entry for the same day is rejected
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(body): Json<NewJournalEntry>,
) -> Result<Json<ApiResponse<JournalEntry>>, AppError> {
    let user = session.require_user()?;

    match journal_repo::insert_entry(&state.db, user.id, &body).await {
        Ok(entry) => Ok(ApiResponse::ok(entry)),
        Err(e) if is_unique_violation(&e) => Err(AppError::BadRequest(format!(
            "a journal entry for {} already exists",
            body.date
        ))),
        Err(e) => Err(e.into()),
    }
}

/// PATCH /api/journal/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(patch): Json<JournalPatch>,
) -> Result<Json<ApiResponse<JournalEntry>>, AppError> {
    let user = session.require_user()?;
    let entry = journal_repo::update_entry(&state.db, user.id, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("journal entry not found".into()))?;

    Ok(ApiResponse::ok(entry))
}

/// DELETE /api/journal/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user = session.require_user()?;
    if !journal_repo::delete_entry(&state.db, user.id, id).await? {
        return Err(AppError::NotFound("journal entry not found".into()));
    }

    Ok(ApiResponse::done())
}

/// GET /api/journal-days/{date}: the day's entry, or null
pub async fn get_day(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<ApiResponse<Option<JournalEntry>>>, AppError> {
    let user = session.require_user()?;
    let entry = journal_repo::get_entry_for_date(&state.db, user.id, date).await?;

    Ok(ApiResponse::ok(entry))
}

/// PUT /api/journal-days/{date}: save now, superseding any pending draft
pub async fn save_day(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<DaySaveRequest>,
) -> Result<Json<ApiResponse<JournalEntry>>, AppError> {
    let user = session.require_user()?;

    // Held across the upsert so no draft for the day lands on top of it
    let _day = state.autosave.supersede(user.id, date).await;
    let entry = journal_repo::upsert_entry_for_date(
        &state.db,
        user.id,
        date,
        serialize_content(&body.content).as_deref(),
        body.mood_score,
    )
    .await?;

    Ok(ApiResponse::ok(entry))
}

/// PUT /api/journal-days/{date}/draft: debounced save; 202 right away
pub async fn save_draft(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<DraftRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let user = session.require_user()?;

    state
        .autosave
        .schedule(user.id, date, serialize_content(&body.content));

    Ok((StatusCode::ACCEPTED, ApiResponse::done()))
}
