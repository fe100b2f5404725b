use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewTrade, Trade, TradePatch};

/// Insert a trade owned by `owner`.
pub async fn insert_trade(pool: &PgPool, owner: Uuid, trade: &NewTrade) -> anyhow::Result<Trade> {
    let trade = sqlx::query_as::<_, Trade>(
        r#"
        INSERT INTO trades (user_id, symbol, direction, quantity, price, timestamp, fee, currency, notes, broker_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(&trade.symbol)
    .bind(trade.direction.as_str())
    .bind(trade.quantity)
    .bind(trade.price)
    .bind(trade.timestamp)
    .bind(trade.fee)
    .bind(&trade.currency)
    .bind(&trade.notes)
    .bind(&trade.broker_id)
    .fetch_one(pool)
    .await?;

    Ok(trade)
}

/// All trades for an owner, newest first, optionally for one symbol.
pub async fn get_trades(
    pool: &PgPool,
    owner: Uuid,
    symbol: Option<&str>,
) -> anyhow::Result<Vec<Trade>> {
    let trades = sqlx::query_as::<_, Trade>(
        r#"
        SELECT * FROM trades
        WHERE user_id = $1 AND ($2::TEXT IS NULL OR symbol = $2)
        ORDER BY timestamp DESC
        "#,
    )
    .bind(owner)
    .bind(symbol)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

/// The N most recent trades for an owner.
pub async fn get_recent_trades(pool: &PgPool, owner: Uuid, limit: i64) -> anyhow::Result<Vec<Trade>> {
    let trades = sqlx::query_as::<_, Trade>(
        "SELECT * FROM trades WHERE user_id = $1 ORDER BY timestamp DESC LIMIT $2",
    )
    .bind(owner)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

/// Trades logged since `since`, newest first.
pub async fn get_trades_since(
    pool: &PgPool,
    owner: Uuid,
    since: DateTime<Utc>,
    limit: i64,
) -> anyhow::Result<Vec<Trade>> {
    let trades = sqlx::query_as::<_, Trade>(
        r#"
        SELECT * FROM trades
        WHERE user_id = $1 AND timestamp >= $2
        ORDER BY timestamp DESC
        LIMIT $3
        "#,
    )
    .bind(owner)
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

pub async fn get_trade_by_id(pool: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>("SELECT * FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

    Ok(trade)
}

/// Overwrite the fields present in `patch`. Returns `None` if the trade is not owned.
pub async fn update_trade(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    patch: &TradePatch,
) -> anyhow::Result<Option<Trade>> {
    let trade = sqlx::query_as::<_, Trade>(
        r#"
        UPDATE trades SET
            symbol    = COALESCE($3, symbol),
            direction = COALESCE($4, direction),
            quantity  = COALESCE($5, quantity),
            price     = COALESCE($6, price),
            timestamp = COALESCE($7, timestamp),
            fee       = COALESCE($8, fee),
            currency  = COALESCE($9, currency),
            notes     = COALESCE($10, notes)
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(&patch.symbol)
    .bind(patch.direction.map(|d| d.as_str()))
    .bind(patch.quantity)
    .bind(patch.price)
    .bind(patch.timestamp)
    .bind(patch.fee)
    .bind(&patch.currency)
    .bind(&patch.notes)
    .fetch_optional(pool)
    .await?;

    Ok(trade)
}

/// Returns true if a row was deleted.
pub async fn delete_trade(pool: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM trades WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
