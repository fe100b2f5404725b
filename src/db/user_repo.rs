use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Make sure a profile row exists for a session user; refresh the email.
pub async fn ensure_user(pool: &PgPool, id: Uuid, email: Option<&str>) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, users.email), updated_at = NOW()
        "#,
    )
    .bind(id)
    .bind(email)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_settings(pool: &PgPool, id: Uuid) -> anyhow::Result<Value> {
    let row: Option<(Value,)> = sqlx::query_as("SELECT settings FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.0).unwrap_or_else(|| Value::Object(Default::default())))
}

/// Shallow-merge `updates` into the stored settings object.
pub async fn merge_settings(
    pool: &PgPool,
    id: Uuid,
    email: Option<&str>,
    updates: &Value,
) -> anyhow::Result<Value> {
    let row: (Value,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, settings)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
            SET settings = users.settings || EXCLUDED.settings, updated_at = NOW()
        RETURNING settings
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(updates)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}
