use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{canvas_repo, journal_repo, rule_repo, trade_repo};
use crate::models::{Canvas, CanvasLayout, JournalEntry, Rule, StockNote, Trade, WatchlistItem};
use crate::session::Session;
use crate::storage::{self, Backend};
use crate::AppState;

use super::snippet::{plain_text_snippet, snippet_from_stored, CONTEXT_SNIPPET_CHARS};

const RECENT_TRADES: usize = 5;
const RECENT_JOURNAL: usize = 5;
const NOTES_PER_SYMBOL: usize = 3;

/// Snapshot of the trader's workspace sent along with each chat turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JarvisContext {
    pub current_date: DateTime<Utc>,
    pub active_canvas: Option<ActiveCanvas>,
    pub recent_trades: Vec<TradeDigest>,
    pub journal_entries: Vec<JournalDigest>,
    pub watchlist: Vec<WatchedSymbol>,
    /// Symbol → most recent notes.
    pub notes: BTreeMap<String, Vec<NoteDigest>>,
    pub active_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCanvas {
    pub id: Uuid,
    pub name: String,
    pub layout: CanvasLayout,
    /// Widgets placed on any breakpoint.
    #[serde(default)]
    pub widgets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDigest {
    pub symbol: String,
    pub direction: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<Trade> for TradeDigest {
    fn from(t: Trade) -> Self {
        Self {
            symbol: t.symbol,
            direction: t.direction,
            quantity: t.quantity,
            price: t.price,
            timestamp: t.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalDigest {
    pub date: NaiveDate,
    pub mood_score: i32,
    pub snippet: String,
}

impl From<JournalEntry> for JournalDigest {
    fn from(e: JournalEntry) -> Self {
        Self {
            date: e.date,
            mood_score: e.mood_score,
            snippet: e
                .content
                .as_deref()
                .map(|raw| snippet_from_stored(raw, CONTEXT_SNIPPET_CHARS))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedSymbol {
    pub symbol: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDigest {
    pub title: String,
    pub snippet: String,
    pub updated_at: DateTime<Utc>,
}

/// Assemble the context for a session. Each source is fetched concurrently;
/// a failing source is logged and left empty, so this never fails.
pub async fn get_context(
    state: &AppState,
    session: &Session,
    active_canvas_id: Option<Uuid>,
) -> JarvisContext {
    let pool = &state.db;
    let owner = session.owner();
    let backend = Backend::select(pool, &state.device_store, session).ok();

    gather(
        active_canvas_id,
        async move {
            match owner {
                Some(owner) => trade_repo::get_recent_trades(pool, owner, RECENT_TRADES as i64).await,
                None => Ok(Vec::new()),
            }
        },
        async move {
            match owner {
                Some(owner) => journal_repo::get_recent_entries(pool, owner, RECENT_JOURNAL as i64).await,
                None => Ok(Vec::new()),
            }
        },
        async move {
            match owner {
                Some(owner) => canvas_repo::get_user_canvases(pool, owner).await,
                None => Ok(Vec::new()),
            }
        },
        async move {
            match backend {
                Some(backend) => storage::watchlist::list(backend).await,
                None => Ok(Vec::new()),
            }
        },
        async move {
            match backend {
                Some(backend) => storage::notes::list_all(backend).await,
                None => Ok(Vec::new()),
            }
        },
        async move {
            match owner {
                Some(owner) => rule_repo::get_rules(pool, owner).await,
                None => Ok(Vec::new()),
            }
        },
    )
    .await
}

/// Run every fetch concurrently and fold the results into a context.
pub async fn gather<FT, FJ, FC, FW, FN, FR>(
    active_canvas_id: Option<Uuid>,
    trades: FT,
    journal: FJ,
    canvases: FC,
    watchlist: FW,
    notes: FN,
    rules: FR,
) -> JarvisContext
where
    FT: Future<Output = anyhow::Result<Vec<Trade>>>,
    FJ: Future<Output = anyhow::Result<Vec<JournalEntry>>>,
    FC: Future<Output = anyhow::Result<Vec<Canvas>>>,
    FW: Future<Output = anyhow::Result<Vec<WatchlistItem>>>,
    FN: Future<Output = anyhow::Result<Vec<StockNote>>>,
    FR: Future<Output = anyhow::Result<Vec<Rule>>>,
{
    let (trades, journal, canvases, watchlist, notes, rules) =
        tokio::join!(trades, journal, canvases, watchlist, notes, rules);

    let canvases = or_empty("canvases", canvases);

    JarvisContext {
        current_date: Utc::now(),
        active_canvas: pick_active_canvas(canvases, active_canvas_id),
        recent_trades: or_empty("trades", trades)
            .into_iter()
            .take(RECENT_TRADES)
            .map(TradeDigest::from)
            .collect(),
        journal_entries: or_empty("journal", journal)
            .into_iter()
            .take(RECENT_JOURNAL)
            .map(JournalDigest::from)
            .collect(),
        watchlist: or_empty("watchlist", watchlist)
            .into_iter()
            .map(|item| WatchedSymbol {
                symbol: item.symbol,
                added_at: item.added_at,
            })
            .collect(),
        notes: group_notes(or_empty("notes", notes)),
        active_rules: or_empty("rules", rules)
            .into_iter()
            .filter(|r| r.is_active)
            .map(|r| r.title)
            .collect(),
    }
}

fn or_empty<T>(source: &str, result: anyhow::Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, source, "Jarvis failed to load context source");
        Vec::new()
    })
}

/// Requested canvas if present, else the default-flagged one, else the first.
fn pick_active_canvas(canvases: Vec<Canvas>, requested: Option<Uuid>) -> Option<ActiveCanvas> {
    let index = requested
        .and_then(|id| canvases.iter().position(|c| c.id == id))
        .or_else(|| canvases.iter().position(|c| c.is_default))
        .or(if canvases.is_empty() { None } else { Some(0) })?;

    let canvas = canvases.into_iter().nth(index)?;
    let layout = canvas.parsed_layout();
    let widgets = layout.widget_ids().into_iter().map(str::to_string).collect();
    Some(ActiveCanvas {
        id: canvas.id,
        name: canvas.name,
        layout,
        widgets,
    })
}

/// Notes arrive newest first; keep the first few per symbol.
fn group_notes(notes: Vec<StockNote>) -> BTreeMap<String, Vec<NoteDigest>> {
    let mut grouped: BTreeMap<String, Vec<NoteDigest>> = BTreeMap::new();

    for note in notes {
        let bucket = grouped.entry(note.symbol.clone()).or_default();
        if bucket.len() >= NOTES_PER_SYMBOL {
            continue;
        }
        bucket.push(NoteDigest {
            snippet: note
                .content
                .as_ref()
                .map(|blocks| plain_text_snippet(blocks, CONTEXT_SNIPPET_CHARS))
                .unwrap_or_default(),
            title: note.title,
            updated_at: note.updated_at,
        });
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn trade(symbol: &str) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            symbol: symbol.into(),
            direction: "BUY".into(),
            quantity: Decimal::from(10),
            price: Decimal::from(100),
            timestamp: Utc::now(),
            fee: Decimal::ZERO,
            currency: "USD".into(),
            notes: None,
            broker_id: None,
            created_at: Utc::now(),
        }
    }

    fn canvas(name: &str, is_default: bool) -> Canvas {
        Canvas {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.into(),
            layout: json!({
                "lg": [{ "i": "jarvis", "x": 0, "y": 0, "w": 4, "h": 6 }],
                "sm": [{ "i": "trades", "x": 0, "y": 0, "w": 2, "h": 2 }]
            }),
            is_public: false,
            is_default,
            likes_count: 0,
            description: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn note(symbol: &str, minutes_ago: i64) -> StockNote {
        StockNote {
            id: Uuid::new_v4(),
            user_id: None,
            symbol: symbol.into(),
            title: format!("{symbol} {minutes_ago}"),
            content: Some(json!([{ "content": [{ "text": "x".repeat(400) }] }])),
            position: None,
            size: None,
            updated_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn failing_source_defaults_to_empty() {
        let ctx = gather(
            None,
            async { Ok((0..8).map(|_| trade("AAPL")).collect()) },
            async { Ok(Vec::new()) },
            async { Ok(vec![canvas("Main", false)]) },
            async { Err(anyhow::anyhow!("watchlist table unavailable")) },
            async { Ok(Vec::new()) },
            async { Err(anyhow::anyhow!("rules unavailable")) },
        )
        .await;

        assert!(ctx.watchlist.is_empty());
        assert!(ctx.active_rules.is_empty());
        assert_eq!(ctx.recent_trades.len(), RECENT_TRADES);
        assert_eq!(ctx.active_canvas.map(|c| c.name), Some("Main".to_string()));
    }

    #[test]
    fn active_canvas_prefers_requested_then_default() {
        let first = canvas("First", false);
        let default = canvas("Default", true);
        let requested = canvas("Requested", false);
        let requested_id = requested.id;
        let all = vec![first, default, requested];

        let picked = pick_active_canvas(all.clone(), Some(requested_id)).unwrap();
        assert_eq!(picked.name, "Requested");
        assert_eq!(picked.widgets, vec!["jarvis".to_string(), "trades".to_string()]);
        assert_eq!(picked.layout.breakpoints["lg"][0].w, 4);

        let picked = pick_active_canvas(all.clone(), None).unwrap();
        assert_eq!(picked.name, "Default");

        let picked = pick_active_canvas(all, Some(Uuid::new_v4())).unwrap();
        assert_eq!(picked.name, "Default");

        assert!(pick_active_canvas(Vec::new(), None).is_none());
    }

    #[test]
    fn notes_are_capped_per_symbol_with_short_snippets() {
        let notes = vec![
            note("AAPL", 1),
            note("AAPL", 2),
            note("TSLA", 3),
            note("AAPL", 4),
            note("AAPL", 5),
        ];

        let grouped = group_notes(notes);
        assert_eq!(grouped["AAPL"].len(), NOTES_PER_SYMBOL);
        assert_eq!(grouped["AAPL"][0].title, "AAPL 1");
        assert_eq!(grouped["TSLA"].len(), 1);
        assert_eq!(grouped["TSLA"][0].snippet.chars().count(), CONTEXT_SNIPPET_CHARS);
    }

    #[test]
    fn context_accepts_partial_client_payload() {
        let ctx: JarvisContext = serde_json::from_value(json!({
            "currentDate": "2024-03-01T12:00:00Z",
            "activeRules": ["No revenge trades"]
        }))
        .unwrap();

        assert_eq!(ctx.active_rules, vec!["No revenge trades".to_string()]);
        assert!(ctx.recent_trades.is_empty());
    }
}
