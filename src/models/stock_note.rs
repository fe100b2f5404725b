use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_NOTE_TITLE: &str = "New Note";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotePosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSize {
    pub width: f64,
    pub height: f64,
}

/// A free-form note pinned to a symbol's canvas. Several notes per symbol are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StockNote {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub symbol: String,
    pub title: String,
    pub content: Option<Value>,
    pub position: Option<Json<NotePosition>>,
    pub size: Option<Json<NoteSize>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewStockNote {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub position: Option<NotePosition>,
    pub size: Option<NoteSize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StockNotePatch {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub position: Option<NotePosition>,
    pub size: Option<NoteSize>,
}

impl StockNote {
    pub fn apply(&mut self, patch: &StockNotePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
        if let Some(position) = patch.position {
            self.position = Some(Json(position));
        }
        if let Some(size) = patch.size {
            self.size = Some(Json(size));
        }
        self.updated_at = now;
    }
}

pub fn note_title(title: Option<&str>) -> String {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_NOTE_TITLE)
        .to_string()
}
