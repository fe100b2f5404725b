use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::stock_note::note_title;
use crate::models::{NewStockNote, StockNote, StockNotePatch};

const NOTE_COLUMNS: &str = "id, user_id, symbol, title, content, position, size, updated_at";

pub async fn get_all_notes(pool: &PgPool, owner: Uuid) -> anyhow::Result<Vec<StockNote>> {
    let notes = sqlx::query_as::<_, StockNote>(&format!(
        "SELECT {NOTE_COLUMNS} FROM stock_notes WHERE user_id = $1 ORDER BY updated_at DESC"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(notes)
}

pub async fn get_notes_for_symbol(
    pool: &PgPool,
    owner: Uuid,
    symbol: &str,
) -> anyhow::Result<Vec<StockNote>> {
    let notes = sqlx::query_as::<_, StockNote>(&format!(
        "SELECT {NOTE_COLUMNS} FROM stock_notes WHERE user_id = $1 AND symbol = $2 ORDER BY updated_at DESC"
    ))
    .bind(owner)
    .bind(symbol)
    .fetch_all(pool)
    .await?;

    Ok(notes)
}

pub async fn create_note(
    pool: &PgPool,
    owner: Uuid,
    symbol: &str,
    note: &NewStockNote,
) -> anyhow::Result<StockNote> {
    let note = sqlx::query_as::<_, StockNote>(&format!(
        r#"
        INSERT INTO stock_notes (user_id, symbol, title, content, position, size)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {NOTE_COLUMNS}
        "#
    ))
    .bind(owner)
    .bind(symbol)
    .bind(note_title(note.title.as_deref()))
    .bind(&note.content)
    .bind(note.position.map(Json))
    .bind(note.size.map(Json))
    .fetch_one(pool)
    .await?;

    Ok(note)
}

pub async fn update_note(
    pool: &PgPool,
    owner: Uuid,
    symbol: &str,
    id: Uuid,
    patch: &StockNotePatch,
) -> anyhow::Result<Option<StockNote>> {
    let note = sqlx::query_as::<_, StockNote>(&format!(
        r#"
        UPDATE stock_notes SET
            title      = COALESCE($4, title),
            content    = COALESCE($5, content),
            position   = COALESCE($6, position),
            size       = COALESCE($7, size),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND symbol = $3
        RETURNING {NOTE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner)
    .bind(symbol)
    .bind(&patch.title)
    .bind(&patch.content)
    .bind(patch.position.map(Json))
    .bind(patch.size.map(Json))
    .fetch_optional(pool)
    .await?;

    Ok(note)
}

pub async fn delete_note(pool: &PgPool, owner: Uuid, symbol: &str, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM stock_notes WHERE id = $1 AND user_id = $2 AND symbol = $3")
        .bind(id)
        .bind(owner)
        .bind(symbol)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_notes_for_symbol(pool: &PgPool, owner: Uuid, symbol: &str) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM stock_notes WHERE user_id = $1 AND symbol = $2",
    )
    .bind(owner)
    .bind(symbol)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}
