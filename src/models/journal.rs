use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_MOOD_SCORE: i32 = 5;

/// Database row for journal_entries. `content` holds the serialized
/// rich-text block array exactly as the editor produced it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub content: Option<String>,
    pub mood_score: i32,
    pub tags: Vec<String>,
    pub trade_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJournalEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub content: Value,
    pub mood_score: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub trade_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalPatch {
    pub content: Option<Value>,
    pub mood_score: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub trade_id: Option<Uuid>,
}

/// Serialize editor content for the TEXT column. `null` is stored as NULL.
pub fn serialize_content(content: &Value) -> Option<String> {
    if content.is_null() {
        None
    } else {
        Some(content.to_string())
    }
}
