use sqlx::PgPool;
use uuid::Uuid;

use crate::db::canvas_repo;
use crate::errors::AppError;
use crate::models::{Canvas, CommunityCanvas, NewCanvas};

/// Gallery listing size.
pub const COMMUNITY_LIMIT: i64 = 50;

/// The private copy an importer receives of a community canvas.
pub fn imported_copy(source: &CommunityCanvas) -> NewCanvas {
    NewCanvas {
        name: format!("Imported: {}", source.canvas.name),
        layout: source.canvas.layout.clone(),
        is_public: false,
        description: Some(format!("Imported from {}", source.author_name)),
        tags: source.canvas.tags.clone(),
    }
}

/// Clone a public canvas into a new private canvas owned by `importer`.
pub async fn import_canvas(pool: &PgPool, importer: Uuid, source_id: Uuid) -> Result<Canvas, AppError> {
    let source = canvas_repo::get_community_canvas(pool, source_id)
        .await?
        .ok_or_else(|| AppError::NotFound("canvas not found".into()))?;

    let canvas = canvas_repo::create_canvas(pool, importer, &imported_copy(&source)).await?;

    metrics::counter!("canvases_imported_total").increment(1);
    tracing::info!(
        importer = %importer,
        source = %source_id,
        canvas = %canvas.id,
        "Community canvas imported"
    );

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn imported_copy_is_private_with_identical_layout() {
        let layout = json!({
            "lg": [{ "i": "jarvis", "x": 0, "y": 0, "w": 6, "h": 8, "minW": 3 }],
            "sm": [{ "i": "jarvis", "x": 0, "y": 0, "w": 2, "h": 8 }]
        });
        let source = CommunityCanvas {
            canvas: Canvas {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                name: "Morning Routine".into(),
                layout: layout.clone(),
                is_public: true,
                is_default: true,
                likes_count: 12,
                description: Some("My setup".into()),
                tags: vec!["swing".into()],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            author_name: "ana".into(),
        };

        let copy = imported_copy(&source);
        assert_eq!(copy.name, "Imported: Morning Routine");
        assert_eq!(copy.description.as_deref(), Some("Imported from ana"));
        assert!(!copy.is_public);
        assert_eq!(copy.layout, layout);
        assert_eq!(copy.tags, vec!["swing".to_string()]);
    }
}
