use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::journal::{serialize_content, DEFAULT_MOOD_SCORE};
use crate::models::{JournalEntry, JournalPatch, NewJournalEntry};

pub async fn insert_entry(
    pool: &PgPool,
    owner: Uuid,
    entry: &NewJournalEntry,
) -> anyhow::Result<JournalEntry> {
    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (user_id, date, content, mood_score, tags, trade_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(entry.date)
    .bind(serialize_content(&entry.content))
    .bind(entry.mood_score.unwrap_or(DEFAULT_MOOD_SCORE))
    .bind(&entry.tags)
    .bind(entry.trade_id)
    .fetch_one(pool)
    .await?;

    Ok(entry)
}

/// All entries for an owner, newest day first.
pub async fn get_entries(pool: &PgPool, owner: Uuid) -> anyhow::Result<Vec<JournalEntry>> {
    let entries = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY date DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn get_recent_entries(
    pool: &PgPool,
    owner: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<JournalEntry>> {
    let entries = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY date DESC LIMIT $2",
    )
    .bind(owner)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Entries dated on or after `since`, newest first.
pub async fn get_entries_since(
    pool: &PgPool,
    owner: Uuid,
    since: NaiveDate,
) -> anyhow::Result<Vec<JournalEntry>> {
    let entries = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE user_id = $1 AND date >= $2 ORDER BY date DESC",
    )
    .bind(owner)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn get_entry_for_date(
    pool: &PgPool,
    owner: Uuid,
    date: NaiveDate,
) -> anyhow::Result<Option<JournalEntry>> {
    let entry = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE user_id = $1 AND date = $2",
    )
    .bind(owner)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn get_entries_for_trade(
    pool: &PgPool,
    owner: Uuid,
    trade_id: Uuid,
) -> anyhow::Result<Vec<JournalEntry>> {
    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1 AND trade_id = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner)
    .bind(trade_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Write the day's content, creating the entry if the day has none yet.
/// `mood_score` only applies when given; a new entry otherwise gets the default.
pub async fn upsert_entry_for_date(
    pool: &PgPool,
    owner: Uuid,
    date: NaiveDate,
    content: Option<&str>,
    mood_score: Option<i32>,
) -> anyhow::Result<JournalEntry> {
    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (user_id, date, content, mood_score)
        VALUES ($1, $2, $3, COALESCE($4, $5))
        ON CONFLICT (user_id, date) DO UPDATE
            SET content = EXCLUDED.content,
                mood_score = COALESCE($4, journal_entries.mood_score),
                updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(date)
    .bind(content)
    .bind(mood_score)
    .bind(DEFAULT_MOOD_SCORE)
    .fetch_one(pool)
    .await?;

    Ok(entry)
}

pub async fn update_entry(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    patch: &JournalPatch,
) -> anyhow::Result<Option<JournalEntry>> {
    let content = patch.content.as_ref().and_then(serialize_content);

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        UPDATE journal_entries SET
            content    = COALESCE($3, content),
            mood_score = COALESCE($4, mood_score),
            tags       = COALESCE($5, tags),
            trade_id   = COALESCE($6, trade_id),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(content)
    .bind(patch.mood_score)
    .bind(&patch.tags)
    .bind(patch.trade_id)
    .fetch_optional(pool)
    .await?;

    Ok(entry)
}

pub async fn delete_entry(pool: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
