use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One watched ticker. `user_id` is `None` for items kept in the device store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WatchlistItem {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub symbol: String,
    pub added_at: DateTime<Utc>,
    pub has_notes: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WatchlistPatch {
    pub display_order: Option<i32>,
    pub has_notes: Option<bool>,
}

impl WatchlistItem {
    pub fn apply(&mut self, patch: &WatchlistPatch) {
        if let Some(order) = patch.display_order {
            self.display_order = order;
        }
        if let Some(has_notes) = patch.has_notes {
            self.has_notes = has_notes;
        }
    }
}

/// Next display slot after the current maximum; an empty list starts at 1.
pub fn next_display_order(items: &[WatchlistItem]) -> i32 {
    items.iter().map(|i| i.display_order).max().unwrap_or(0) + 1
}
