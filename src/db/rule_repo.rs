use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{clean_optional, NewRule, NewSetup, Rule, RulePatch, Setup, SetupPatch};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub async fn create_rule(pool: &PgPool, owner: Uuid, rule: &NewRule) -> anyhow::Result<Rule> {
    let rule = sqlx::query_as::<_, Rule>(
        r#"
        INSERT INTO rules (user_id, title, description, category, is_active)
        VALUES ($1, $2, $3, $4, true)
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(rule.title.trim())
    .bind(clean_optional(rule.description.clone()))
    .bind(clean_optional(rule.category.clone()))
    .fetch_one(pool)
    .await?;

    Ok(rule)
}

pub async fn get_rules(pool: &PgPool, owner: Uuid) -> anyhow::Result<Vec<Rule>> {
    let rules = sqlx::query_as::<_, Rule>(
        "SELECT * FROM rules WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

pub async fn update_rule(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    patch: &RulePatch,
) -> anyhow::Result<Option<Rule>> {
    let rule = sqlx::query_as::<_, Rule>(
        r#"
        UPDATE rules SET
            title       = COALESCE($3, title),
            description = COALESCE($4, description),
            category    = COALESCE($5, category),
            is_active   = COALESCE($6, is_active)
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(patch.title.as_deref().map(str::trim))
    .bind(clean_optional(patch.description.clone()))
    .bind(clean_optional(patch.category.clone()))
    .bind(patch.is_active)
    .fetch_optional(pool)
    .await?;

    Ok(rule)
}

/// Flip `is_active` and return the updated rule.
pub async fn toggle_rule(pool: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Rule>> {
    let rule = sqlx::query_as::<_, Rule>(
        "UPDATE rules SET is_active = NOT is_active WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    Ok(rule)
}

pub async fn delete_rule(pool: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM rules WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_active_rules(pool: &PgPool, owner: Uuid) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM rules WHERE user_id = $1 AND is_active = true",
    )
    .bind(owner)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

// ---------------------------------------------------------------------------
// Setups
// ---------------------------------------------------------------------------

pub async fn create_setup(pool: &PgPool, owner: Uuid, setup: &NewSetup) -> anyhow::Result<Setup> {
    let setup = sqlx::query_as::<_, Setup>(
        r#"
        INSERT INTO setups (user_id, name, description, category)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(setup.name.trim())
    .bind(clean_optional(setup.description.clone()))
    .bind(clean_optional(setup.category.clone()))
    .fetch_one(pool)
    .await?;

    Ok(setup)
}

pub async fn get_setups(pool: &PgPool, owner: Uuid) -> anyhow::Result<Vec<Setup>> {
    let setups = sqlx::query_as::<_, Setup>(
        "SELECT * FROM setups WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(setups)
}

pub async fn update_setup(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    patch: &SetupPatch,
) -> anyhow::Result<Option<Setup>> {
    let setup = sqlx::query_as::<_, Setup>(
        r#"
        UPDATE setups SET
            name        = COALESCE($3, name),
            description = COALESCE($4, description),
            category    = COALESCE($5, category)
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(clean_optional(patch.description.clone()))
    .bind(clean_optional(patch.category.clone()))
    .fetch_optional(pool)
    .await?;

    Ok(setup)
}

pub async fn delete_setup(pool: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM setups WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
