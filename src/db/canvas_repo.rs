use sqlx::PgPool;
use uuid::Uuid;

use crate::models::canvas::author_display_name;
use crate::models::{Canvas, CanvasPatch, CommunityCanvas, NewCanvas};

/// Community gallery row: canvas joined with its author's profile.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CommunityCanvasRow {
    #[sqlx(flatten)]
    canvas: Canvas,
    author_email: Option<String>,
    author_display_name: Option<String>,
}

impl From<CommunityCanvasRow> for CommunityCanvas {
    fn from(row: CommunityCanvasRow) -> Self {
        let author_name =
            author_display_name(row.author_display_name.as_deref(), row.author_email.as_deref());
        CommunityCanvas {
            canvas: row.canvas,
            author_name,
        }
    }
}

// ---------------------------------------------------------------------------
// Canvas CRUD
// ---------------------------------------------------------------------------

pub async fn create_canvas(pool: &PgPool, owner: Uuid, canvas: &NewCanvas) -> anyhow::Result<Canvas> {
    let canvas = sqlx::query_as::<_, Canvas>(
        r#"
        INSERT INTO canvases (user_id, name, layout, is_public, description, tags, likes_count)
        VALUES ($1, $2, $3, $4, $5, $6, 0)
        RETURNING *
        "#,
    )
    .bind(owner)
    .bind(&canvas.name)
    .bind(&canvas.layout)
    .bind(canvas.is_public)
    .bind(&canvas.description)
    .bind(&canvas.tags)
    .fetch_one(pool)
    .await?;

    Ok(canvas)
}

/// Owner's canvases, newest first.
pub async fn get_user_canvases(pool: &PgPool, owner: Uuid) -> anyhow::Result<Vec<Canvas>> {
    let canvases = sqlx::query_as::<_, Canvas>(
        "SELECT * FROM canvases WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    Ok(canvases)
}

pub async fn get_canvas_by_id(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Canvas>> {
    let canvas = sqlx::query_as::<_, Canvas>("SELECT * FROM canvases WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(canvas)
}

/// Public canvases ordered by likes, with a best-effort author name.
pub async fn get_community_canvases(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<CommunityCanvas>> {
    let rows = sqlx::query_as::<_, CommunityCanvasRow>(
        r#"
        SELECT c.*, u.email AS author_email, u.settings->>'display_name' AS author_display_name
        FROM canvases c
        LEFT JOIN users u ON u.id = c.user_id
        WHERE c.is_public = true
        ORDER BY c.likes_count DESC, c.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CommunityCanvas::from).collect())
}

pub async fn get_community_canvas(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<CommunityCanvas>> {
    let row = sqlx::query_as::<_, CommunityCanvasRow>(
        r#"
        SELECT c.*, u.email AS author_email, u.settings->>'display_name' AS author_display_name
        FROM canvases c
        LEFT JOIN users u ON u.id = c.user_id
        WHERE c.id = $1 AND c.is_public = true
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(CommunityCanvas::from))
}

/// Overwrite present fields of an owned canvas. No concurrency check: last writer wins.
pub async fn update_canvas(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    patch: &CanvasPatch,
) -> anyhow::Result<Option<Canvas>> {
    let canvas = sqlx::query_as::<_, Canvas>(
        r#"
        UPDATE canvases SET
            name        = COALESCE($3, name),
            layout      = COALESCE($4, layout),
            is_public   = COALESCE($5, is_public),
            is_default  = COALESCE($6, is_default),
            description = COALESCE($7, description),
            tags        = COALESCE($8, tags),
            updated_at  = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(&patch.name)
    .bind(&patch.layout)
    .bind(patch.is_public)
    .bind(patch.is_default)
    .bind(&patch.description)
    .bind(&patch.tags)
    .fetch_optional(pool)
    .await?;

    Ok(canvas)
}

/// Clear `is_default` on every other canvas of the owner.
pub async fn clear_other_defaults(pool: &PgPool, owner: Uuid, keep: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE canvases SET is_default = false WHERE user_id = $1 AND id <> $2 AND is_default")
        .bind(owner)
        .bind(keep)
        .execute(pool)
        .await?;

    Ok(())
}

/// Flip the public flag. Likes and other metadata are kept.
pub async fn set_public(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    is_public: bool,
) -> anyhow::Result<Option<Canvas>> {
    let canvas = sqlx::query_as::<_, Canvas>(
        r#"
        UPDATE canvases SET is_public = $3, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(is_public)
    .fetch_optional(pool)
    .await?;

    Ok(canvas)
}

/// Increment the like counter of a public canvas.
pub async fn like_canvas(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Canvas>> {
    let canvas = sqlx::query_as::<_, Canvas>(
        r#"
        UPDATE canvases SET likes_count = likes_count + 1
        WHERE id = $1 AND is_public = true
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(canvas)
}

pub async fn delete_canvas(pool: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM canvases WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
