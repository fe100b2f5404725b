use chrono::Utc;
use uuid::Uuid;

use crate::db::watchlist_repo;
use crate::models::watchlist::next_display_order;
use crate::models::{normalize_symbol, WatchlistItem, WatchlistPatch};

use super::device::WATCHLIST_KEY;
use super::Backend;

/// Watchlist ordered by `display_order`.
pub async fn list(backend: Backend<'_>) -> anyhow::Result<Vec<WatchlistItem>> {
    match backend {
        Backend::Remote { pool, owner } => watchlist_repo::get_watchlist(pool, owner).await,
        Backend::Device { store, device_id } => {
            let mut items: Vec<WatchlistItem> = store.load(device_id, WATCHLIST_KEY).await?;
            items.sort_by_key(|i| i.display_order);
            Ok(items)
        }
    }
}

/// Add a symbol; adding one that is already watched returns the existing item.
pub async fn add(backend: Backend<'_>, symbol: &str) -> anyhow::Result<WatchlistItem> {
    let symbol = normalize_symbol(symbol);

    match backend {
        Backend::Remote { pool, owner } => watchlist_repo::add_item(pool, owner, &symbol).await,
        Backend::Device { store, device_id } => {
            store
                .update(device_id, WATCHLIST_KEY, |items: &mut Vec<WatchlistItem>| {
                    if let Some(existing) = items.iter().find(|i| i.symbol == symbol) {
                        return existing.clone();
                    }

                    let item = WatchlistItem {
                        id: Uuid::new_v4(),
                        user_id: None,
                        symbol: symbol.clone(),
                        added_at: Utc::now(),
                        has_notes: false,
                        display_order: next_display_order(items),
                    };
                    items.push(item.clone());
                    item
                })
                .await
        }
    }
}

pub async fn update(
    backend: Backend<'_>,
    symbol: &str,
    patch: &WatchlistPatch,
) -> anyhow::Result<Option<WatchlistItem>> {
    let symbol = normalize_symbol(symbol);

    match backend {
        Backend::Remote { pool, owner } => {
            watchlist_repo::update_item(pool, owner, &symbol, patch).await
        }
        Backend::Device { store, device_id } => {
            store
                .update(device_id, WATCHLIST_KEY, |items: &mut Vec<WatchlistItem>| {
                    items.iter_mut().find(|i| i.symbol == symbol).map(|item| {
                        item.apply(patch);
                        item.clone()
                    })
                })
                .await
        }
    }
}

/// Returns true if the symbol was on the list.
pub async fn remove(backend: Backend<'_>, symbol: &str) -> anyhow::Result<bool> {
    let symbol = normalize_symbol(symbol);

    match backend {
        Backend::Remote { pool, owner } => watchlist_repo::remove_item(pool, owner, &symbol).await,
        Backend::Device { store, device_id } => {
            store
                .update(device_id, WATCHLIST_KEY, |items: &mut Vec<WatchlistItem>| {
                    let before = items.len();
                    items.retain(|i| i.symbol != symbol);
                    items.len() != before
                })
                .await
        }
    }
}

/// Keep the `has_notes` flag in step with the symbol's notes.
pub async fn set_has_notes(backend: Backend<'_>, symbol: &str, has_notes: bool) -> anyhow::Result<()> {
    match backend {
        Backend::Remote { pool, owner } => {
            watchlist_repo::set_has_notes(pool, owner, &normalize_symbol(symbol), has_notes).await
        }
        Backend::Device { .. } => {
            let patch = WatchlistPatch {
                has_notes: Some(has_notes),
                ..Default::default()
            };
            update(backend, symbol, &patch).await.map(|_| ())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DeviceStore;

    fn device(store: &DeviceStore) -> Backend<'_> {
        Backend::Device {
            store,
            device_id: "device-test",
        }
    }

    #[tokio::test]
    async fn device_add_is_idempotent_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());

        let first = add(device(&store), "aapl").await.unwrap();
        let second = add(device(&store), "MSFT").await.unwrap();
        let again = add(device(&store), " AAPL ").await.unwrap();

        assert_eq!(first.symbol, "AAPL");
        assert_eq!(first.display_order, 1);
        assert_eq!(second.display_order, 2);
        assert_eq!(again.id, first.id);

        let items = list(device(&store)).await.unwrap();
        let symbols: Vec<&str> = items.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn device_update_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());
        add(device(&store), "NVDA").await.unwrap();
        add(device(&store), "TSLA").await.unwrap();

        let patch = WatchlistPatch {
            display_order: Some(0),
            has_notes: Some(true),
        };
        let updated = update(device(&store), "tsla", &patch).await.unwrap().unwrap();
        assert!(updated.has_notes);

        let items = list(device(&store)).await.unwrap();
        assert_eq!(items[0].symbol, "TSLA");

        assert!(remove(device(&store), "NVDA").await.unwrap());
        assert!(!remove(device(&store), "NVDA").await.unwrap());
        assert!(update(device(&store), "NVDA", &patch).await.unwrap().is_none());
    }
}
