use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::db::{journal_repo, rule_repo, trade_repo};
use crate::jarvis::snippet::{snippet_from_stored, EXCERPT_CHARS};
use crate::models::{JournalEntry, Trade};
use crate::session::AuthUser;

const TRADES_TODAY_LIMIT: i64 = 5;
const STREAK_DAYS: u64 = 7;
const MAX_PROMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardMode {
    Live,
    Demo,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentTrade {
    pub id: String,
    pub symbol: String,
    pub direction: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl From<Trade> for RecentTrade {
    fn from(t: Trade) -> Self {
        Self {
            id: t.id.to_string(),
            symbol: t.symbol,
            direction: t.direction,
            quantity: t.quantity,
            price: t.price,
            timestamp: t.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestJournal {
    pub date: NaiveDate,
    pub excerpt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub mode: DashboardMode,
    pub user_email: Option<String>,
    pub trades_today: usize,
    pub recent_trades: Vec<RecentTrade>,
    /// Distinct journal days within the last week (0..=7).
    pub journal_streak: usize,
    pub latest_journal: Option<LatestJournal>,
    pub active_rules: i64,
    pub prompts: Vec<String>,
}

/// Live summary for a signed-in user. A failing source is logged and left
/// empty rather than failing the dashboard.
pub async fn summary(pool: &PgPool, user: &AuthUser) -> DashboardSummary {
    let now = Utc::now();
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc())
        .unwrap_or(now);
    let week_start = now
        .date_naive()
        .checked_sub_days(Days::new(STREAK_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);

    let (trades, journals, active_rules) = tokio::join!(
        trade_repo::get_trades_since(pool, user.id, start_of_day, TRADES_TODAY_LIMIT),
        journal_repo::get_entries_since(pool, user.id, week_start),
        rule_repo::count_active_rules(pool, user.id),
    );

    let trades = trades.unwrap_or_else(|e| {
        tracing::warn!(error = %e, owner = %user.id, "Dashboard failed to load trades");
        Vec::new()
    });
    let journals = journals.unwrap_or_else(|e| {
        tracing::warn!(error = %e, owner = %user.id, "Dashboard failed to load journal");
        Vec::new()
    });
    let active_rules = active_rules.unwrap_or_else(|e| {
        tracing::warn!(error = %e, owner = %user.id, "Dashboard failed to count rules");
        0
    });

    let mut summary = DashboardSummary {
        mode: DashboardMode::Live,
        user_email: user.email.clone(),
        trades_today: trades.len(),
        recent_trades: trades.into_iter().map(RecentTrade::from).collect(),
        journal_streak: journal_streak(&journals),
        latest_journal: journals.first().map(|entry| LatestJournal {
            date: entry.date,
            excerpt: entry
                .content
                .as_deref()
                .map(|raw| snippet_from_stored(raw, EXCERPT_CHARS))
                .unwrap_or_default(),
        }),
        active_rules,
        prompts: Vec::new(),
    };
    summary.prompts = build_prompts(&summary);
    summary
}

/// Sample payload shown to visitors who are not signed in.
pub fn demo_summary() -> DashboardSummary {
    let now = Utc::now();
    let mut summary = DashboardSummary {
        mode: DashboardMode::Demo,
        user_email: None,
        trades_today: 1,
        recent_trades: vec![
            RecentTrade {
                id: "demo-1".into(),
                symbol: "AAPL".into(),
                direction: "BUY".into(),
                quantity: Decimal::from(50),
                price: Decimal::new(1812, 1),
                timestamp: now,
            },
            RecentTrade {
                id: "demo-2".into(),
                symbol: "TSLA".into(),
                direction: "SELL".into(),
                quantity: Decimal::from(12),
                price: Decimal::new(1768, 1),
                timestamp: now - chrono::Duration::hours(3),
            },
        ],
        journal_streak: 3,
        latest_journal: Some(LatestJournal {
            date: now.date_naive(),
            excerpt: "Refined swing plan: focus on quality names at weekly demand. No revenge trades after first loss.".into(),
        }),
        active_rules: 4,
        prompts: Vec::new(),
    };
    summary.prompts = build_prompts(&summary);
    summary
}

pub fn journal_streak(entries: &[JournalEntry]) -> usize {
    entries.iter().map(|e| e.date).collect::<BTreeSet<_>>().len()
}

/// Coaching nudges for the day, most important first, at most three.
pub fn build_prompts(summary: &DashboardSummary) -> Vec<String> {
    let mut prompts = Vec::new();

    if summary.trades_today == 0 {
        prompts.push("No trades logged yet. Walk through your checklist before entering anything that feels like a chase.");
    } else {
        prompts.push("Review each trade against your rules before the close. Mark any discipline slips explicitly.");
    }

    if summary.latest_journal.is_none() {
        prompts.push("Capture a quick reflection. Even two sentences keep the streak alive and calm the mind.");
    } else if summary.journal_streak < 3 {
        prompts.push("Your journaling streak is young. Stack a few more days to lock the habit.");
    }

    if summary.active_rules == 0 {
        prompts.push("Define at least one guardrail rule today (e.g., max daily loss or avoid trading first 15 minutes).");
    }

    if summary.mode == DashboardMode::Demo {
        prompts.push("Sign in to move from demo data to your real trading room.");
    }

    prompts.into_iter().take(MAX_PROMPTS).map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(date: &str) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: date.parse().unwrap(),
            content: None,
            mood_score: 5,
            tags: Vec::new(),
            trade_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn empty_live() -> DashboardSummary {
        DashboardSummary {
            mode: DashboardMode::Live,
            user_email: None,
            trades_today: 0,
            recent_trades: Vec::new(),
            journal_streak: 0,
            latest_journal: None,
            active_rules: 0,
            prompts: Vec::new(),
        }
    }

    #[test]
    fn streak_counts_distinct_days() {
        let entries = vec![entry("2024-03-05"), entry("2024-03-05"), entry("2024-03-04")];
        assert_eq!(journal_streak(&entries), 2);
    }

    #[test]
    fn prompts_are_capped_at_three() {
        let prompts = build_prompts(&empty_live());
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].starts_with("No trades logged yet"));
        assert!(prompts[1].starts_with("Capture a quick reflection"));
        assert!(prompts[2].starts_with("Define at least one guardrail"));
    }

    #[test]
    fn young_streak_gets_a_nudge() {
        let summary = DashboardSummary {
            trades_today: 2,
            journal_streak: 1,
            latest_journal: Some(LatestJournal {
                date: "2024-03-05".parse().unwrap(),
                excerpt: String::new(),
            }),
            active_rules: 2,
            ..empty_live()
        };

        let prompts = build_prompts(&summary);
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].starts_with("Review each trade"));
        assert!(prompts[1].starts_with("Your journaling streak is young"));
    }

    #[test]
    fn demo_payload_is_marked_demo() {
        let demo = demo_summary();
        assert_eq!(demo.mode, DashboardMode::Demo);
        assert_eq!(demo.recent_trades.len(), 2);
        assert_eq!(demo.prompts, vec![
            "Review each trade against your rules before the close. Mark any discipline slips explicitly.".to_string(),
            "Sign in to move from demo data to your real trading room.".to_string(),
        ]);
    }
}
