pub mod canvas;
pub mod journal;
pub mod market;
pub mod rule;
pub mod stock_note;
pub mod trade;
pub mod watchlist;

pub use canvas::{Canvas, CanvasLayout, CanvasPatch, CommunityCanvas, LayoutItem, NewCanvas};
pub use journal::{JournalEntry, JournalPatch, NewJournalEntry};
pub use market::MarketStock;
pub use rule::{NewRule, NewSetup, Rule, RulePatch, Setup, SetupPatch};
pub use stock_note::{NewStockNote, NotePosition, NoteSize, StockNote, StockNotePatch};
pub use trade::{NewTrade, Trade, TradePatch};
pub use watchlist::{WatchlistItem, WatchlistPatch};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Direction::from_api_str(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid direction: {raw}")))
    }
}

impl Direction {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Direction::Buy),
            "SELL" => Some(Direction::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim a free-text field and map an empty result to `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Canonical ticker form: trimmed, upper-cased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!(Direction::from_api_str("buy"), Some(Direction::Buy));
        assert_eq!(Direction::from_api_str(" SELL "), Some(Direction::Sell));
        assert_eq!(Direction::from_api_str("hold"), None);

        let parsed: Direction = serde_json::from_str(r#""sell""#).unwrap();
        assert_eq!(parsed, Direction::Sell);
        assert!(serde_json::from_str::<Direction>(r#""short""#).is_err());
    }

    #[test]
    fn clean_optional_drops_blank_values() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" risk ".into())), Some("risk".into()));
        assert_eq!(clean_optional(None), None);
    }
}
