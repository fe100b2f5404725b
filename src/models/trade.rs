use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Direction;

/// Database row for the trades table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub direction: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
    pub fee: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub broker_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when logging a trade, manually or from an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrade {
    pub symbol: String,
    pub direction: Direction,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub broker_id: Option<String>,
}

/// Partial update of a trade; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradePatch {
    pub symbol: Option<String>,
    pub direction: Option<Direction>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
    pub fee: Option<Decimal>,
    pub currency: Option<String>,
    pub notes: Option<String>,
}

fn default_currency() -> String {
    "USD".into()
}
