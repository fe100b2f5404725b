use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{WatchlistItem, WatchlistPatch};

pub async fn get_watchlist(pool: &PgPool, owner: Uuid) -> anyhow::Result<Vec<WatchlistItem>> {
    let items = sqlx::query_as::<_, WatchlistItem>(
        "SELECT * FROM watchlist_items WHERE user_id = $1 ORDER BY display_order ASC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

pub async fn get_item(
    pool: &PgPool,
    owner: Uuid,
    symbol: &str,
) -> anyhow::Result<Option<WatchlistItem>> {
    let item = sqlx::query_as::<_, WatchlistItem>(
        "SELECT * FROM watchlist_items WHERE user_id = $1 AND symbol = $2",
    )
    .bind(owner)
    .bind(symbol)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

/// Add `symbol` at the end of the list. An existing item is returned unchanged.
pub async fn add_item(pool: &PgPool, owner: Uuid, symbol: &str) -> anyhow::Result<WatchlistItem> {
    let inserted = sqlx::query_as::<_, WatchlistItem>(
        r#"
        INSERT INTO watchlist_items (user_id, symbol, display_order, has_notes)
        SELECT $1, $2, COALESCE(MAX(display_order), 0) + 1, false
        FROM watchlist_items WHERE user_id = $1
        ON CONFLICT (user_id, symbol) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(symbol)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(item) => Ok(item),
        None => get_item(pool, owner, symbol)
            .await?
            .ok_or_else(|| anyhow::anyhow!("watchlist item {symbol} vanished after conflict")),
    }
}

pub async fn update_item(
    pool: &PgPool,
    owner: Uuid,
    symbol: &str,
    patch: &WatchlistPatch,
) -> anyhow::Result<Option<WatchlistItem>> {
    let item = sqlx::query_as::<_, WatchlistItem>(
        r#"
        UPDATE watchlist_items SET
            display_order = COALESCE($3, display_order),
            has_notes     = COALESCE($4, has_notes)
        WHERE user_id = $1 AND symbol = $2
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(symbol)
    .bind(patch.display_order)
    .bind(patch.has_notes)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

pub async fn set_has_notes(
    pool: &PgPool,
    owner: Uuid,
    symbol: &str,
    has_notes: bool,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE watchlist_items SET has_notes = $3 WHERE user_id = $1 AND symbol = $2")
        .bind(owner)
        .bind(symbol)
        .bind(has_notes)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn remove_item(pool: &PgPool, owner: Uuid, symbol: &str) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM watchlist_items WHERE user_id = $1 AND symbol = $2")
        .bind(owner)
        .bind(symbol)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
