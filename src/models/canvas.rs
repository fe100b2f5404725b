use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

pub const FALLBACK_AUTHOR: &str = "Trader";

/// A named, persisted arrangement of dashboard widgets.
///
/// `layout` is stored exactly as submitted; use [`Canvas::parsed_layout`]
/// for a typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Canvas {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub layout: Value,
    pub is_public: bool,
    pub is_default: bool,
    pub likes_count: i32,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Canvas {
    pub fn parsed_layout(&self) -> CanvasLayout {
        CanvasLayout::from_value(&self.layout)
    }
}

/// A public canvas as listed in the community gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityCanvas {
    #[serde(flatten)]
    pub canvas: Canvas,
    pub author_name: String,
}

/// Widget placement for one breakpoint cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    /// Widget id, matching the id the dashboard renders.
    pub i: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Grid-library options (minW, static, ...) kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Breakpoint name (lg, md, sm, xs, xxs) → ordered widget placements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanvasLayout {
    pub breakpoints: BTreeMap<String, Vec<LayoutItem>>,
}

impl CanvasLayout {
    /// Typed view of a stored layout. Malformed layouts read as empty.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed canvas layout, using empty layout");
                Self::default()
            }
        }
    }

    /// Every widget id placed on any breakpoint.
    pub fn widget_ids(&self) -> BTreeSet<&str> {
        self.breakpoints
            .values()
            .flatten()
            .map(|item| item.i.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewCanvas {
    pub name: String,
    pub layout: Value,
    #[serde(default)]
    pub is_public: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial canvas update; typically only `layout` is sent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CanvasPatch {
    pub name: Option<String>,
    pub layout: Option<Value>,
    pub is_public: Option<bool>,
    pub is_default: Option<bool>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Best-effort author label: settings display name, then email prefix, then "Trader".
pub fn author_display_name(display_name: Option<&str>, email: Option<&str>) -> String {
    if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    email
        .and_then(|e| e.split('@').next())
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or(FALLBACK_AUTHOR)
        .to_string()
}
