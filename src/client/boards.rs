use uuid::Uuid;

use crate::models::{normalize_symbol, Rule, WatchlistItem};

use super::optimistic::apply_optimistic;
use super::{ClientError, RulesRemote, WatchlistRemote};

/// Rules list as a widget holds it: edits show at once and roll back if
/// the server refuses them.
#[derive(Debug)]
pub struct RulesBoard<C> {
    remote: C,
    rules: Vec<Rule>,
}

impl<C: RulesRemote> RulesBoard<C> {
    pub fn new(remote: C, rules: Vec<Rule>) -> Self {
        Self { remote, rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub async fn toggle(&mut self, id: Uuid) -> Result<(), ClientError> {
        let remote = &self.remote;
        let saved = apply_optimistic(
            &mut self.rules,
            |rules| {
                if let Some(rule) = rules.iter_mut().find(|r| r.id == id) {
                    rule.is_active = !rule.is_active;
                }
            },
            || remote.toggle_rule(id),
        )
        .await?;

        // Server copy is authoritative
        if let Some(rule) = self.rules.iter_mut().find(|r| r.id == id) {
            *rule = saved;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<(), ClientError> {
        let remote = &self.remote;
        apply_optimistic(
            &mut self.rules,
            |rules| rules.retain(|r| r.id != id),
            || remote.delete_rule(id),
        )
        .await
    }
}

/// Watchlist as a widget holds it, with the same rollback discipline.
#[derive(Debug)]
pub struct WatchlistBoard<C> {
    remote: C,
    items: Vec<WatchlistItem>,
}

impl<C: WatchlistRemote> WatchlistBoard<C> {
    pub fn new(remote: C, items: Vec<WatchlistItem>) -> Self {
        Self { remote, items }
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.symbol.as_str()).collect()
    }

    /// Add a symbol. A placeholder row is shown until the server returns the stored item.
    pub async fn add(&mut self, symbol: &str) -> Result<(), ClientError> {
        let symbol = normalize_symbol(symbol);
        if self.items.iter().any(|i| i.symbol == symbol) {
            return Ok(());
        }

        let remote = &self.remote;
        let placeholder = WatchlistItem {
            id: Uuid::nil(),
            user_id: None,
            symbol: symbol.clone(),
            added_at: chrono::Utc::now(),
            has_notes: false,
            display_order: crate::models::watchlist::next_display_order(&self.items),
        };

        let stored = apply_optimistic(
            &mut self.items,
            |items| items.push(placeholder),
            || remote.add_symbol(&symbol),
        )
        .await?;

        if let Some(item) = self.items.iter_mut().find(|i| i.symbol == stored.symbol) {
            *item = stored;
        }
        Ok(())
    }

    pub async fn remove(&mut self, symbol: &str) -> Result<(), ClientError> {
        let symbol = normalize_symbol(symbol);
        let remote = &self.remote;
        apply_optimistic(
            &mut self.items,
            |items| items.retain(|i| i.symbol != symbol),
            || remote.remove_symbol(&symbol),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::future::Future;

    fn rule(title: &str, is_active: bool) -> Rule {
        Rule {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            category: None,
            is_active,
            created_at: Utc::now(),
        }
    }

    fn unavailable() -> ClientError {
        ClientError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    /// Remote that either echoes the expected result or fails every call.
    struct FakeRemote {
        fail: bool,
    }

    impl RulesRemote for FakeRemote {
        fn toggle_rule(&self, id: Uuid) -> impl Future<Output = Result<Rule, ClientError>> + Send {
            let fail = self.fail;
            async move {
                if fail {
                    return Err(unavailable());
                }
                let mut r = rule("server copy", false);
                r.id = id;
                Ok(r)
            }
        }

        fn delete_rule(&self, _id: Uuid) -> impl Future<Output = Result<(), ClientError>> + Send {
            let fail = self.fail;
            async move { if fail { Err(unavailable()) } else { Ok(()) } }
        }
    }

    impl WatchlistRemote for FakeRemote {
        fn add_symbol(&self, symbol: &str) -> impl Future<Output = Result<WatchlistItem, ClientError>> + Send {
            let fail = self.fail;
            let symbol = symbol.to_string();
            async move {
                if fail {
                    return Err(unavailable());
                }
                Ok(WatchlistItem {
                    id: Uuid::new_v4(),
                    user_id: None,
                    symbol,
                    added_at: Utc::now(),
                    has_notes: false,
                    display_order: 7,
                })
            }
        }

        fn remove_symbol(&self, _symbol: &str) -> impl Future<Output = Result<(), ClientError>> + Send {
            let fail = self.fail;
            async move { if fail { Err(unavailable()) } else { Ok(()) } }
        }
    }

    #[tokio::test]
    async fn failed_toggle_rolls_back() {
        let original = rule("No trading the open", true);
        let id = original.id;
        let mut board = RulesBoard::new(FakeRemote { fail: true }, vec![original]);

        assert!(board.toggle(id).await.is_err());
        assert!(board.rules()[0].is_active);
    }

    #[tokio::test]
    async fn successful_toggle_takes_server_copy() {
        let original = rule("No trading the open", true);
        let id = original.id;
        let mut board = RulesBoard::new(FakeRemote { fail: false }, vec![original]);

        board.toggle(id).await.unwrap();
        assert_eq!(board.rules()[0].title, "server copy");
        assert!(!board.rules()[0].is_active);
    }

    #[tokio::test]
    async fn failed_rule_delete_restores_row() {
        let rules = vec![rule("a", true), rule("b", true)];
        let id = rules[0].id;
        let mut board = RulesBoard::new(FakeRemote { fail: true }, rules);

        assert!(board.delete(id).await.is_err());
        assert_eq!(board.rules().len(), 2);
    }

    #[tokio::test]
    async fn watchlist_add_and_rollback() {
        let mut ok_board = WatchlistBoard::new(FakeRemote { fail: false }, Vec::new());
        ok_board.add("nvda").await.unwrap();
        assert_eq!(ok_board.symbols(), vec!["NVDA"]);
        assert_eq!(ok_board.items[0].display_order, 7);

        let mut failing = WatchlistBoard::new(FakeRemote { fail: true }, Vec::new());
        assert!(failing.add("nvda").await.is_err());
        assert!(failing.symbols().is_empty());
    }

    #[tokio::test]
    async fn failed_watchlist_remove_restores_symbol() {
        let mut board = WatchlistBoard::new(FakeRemote { fail: false }, Vec::new());
        board.add("AAPL").await.unwrap();

        let items = board.items.clone();
        let mut failing = WatchlistBoard::new(FakeRemote { fail: true }, items);
        assert!(failing.remove("aapl").await.is_err());
        assert_eq!(failing.symbols(), vec!["AAPL"]);
    }
}
