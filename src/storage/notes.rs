use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::stock_note_repo;
use crate::models::stock_note::note_title;
use crate::models::{normalize_symbol, NewStockNote, StockNote, StockNotePatch};

use super::device::STOCK_NOTES_KEY;
use super::{watchlist, Backend};

/// Device document: symbol → notes, newest first.
type DeviceNotes = BTreeMap<String, Vec<StockNote>>;

pub async fn list_all(backend: Backend<'_>) -> anyhow::Result<Vec<StockNote>> {
    match backend {
        Backend::Remote { pool, owner } => stock_note_repo::get_all_notes(pool, owner).await,
        Backend::Device { store, device_id } => {
            let doc: DeviceNotes = store.load(device_id, STOCK_NOTES_KEY).await?;
            let mut notes: Vec<StockNote> = doc.into_values().flatten().collect();
            notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(notes)
        }
    }
}

pub async fn list_for_symbol(backend: Backend<'_>, symbol: &str) -> anyhow::Result<Vec<StockNote>> {
    let symbol = normalize_symbol(symbol);

    match backend {
        Backend::Remote { pool, owner } => {
            stock_note_repo::get_notes_for_symbol(pool, owner, &symbol).await
        }
        Backend::Device { store, device_id } => {
            let mut doc: DeviceNotes = store.load(device_id, STOCK_NOTES_KEY).await?;
            Ok(doc.remove(&symbol).unwrap_or_default())
        }
    }
}

/// Create a note and flag the symbol's watchlist item as having notes.
pub async fn create(
    backend: Backend<'_>,
    symbol: &str,
    note: &NewStockNote,
) -> anyhow::Result<StockNote> {
    let symbol = normalize_symbol(symbol);

    let created = match backend {
        Backend::Remote { pool, owner } => {
            stock_note_repo::create_note(pool, owner, &symbol, note).await?
        }
        Backend::Device { store, device_id } => {
            let record = StockNote {
                id: Uuid::new_v4(),
                user_id: None,
                symbol: symbol.clone(),
                title: note_title(note.title.as_deref()),
                content: note.content.clone(),
                position: note.position.map(Json),
                size: note.size.map(Json),
                updated_at: Utc::now(),
            };

            store
                .update(device_id, STOCK_NOTES_KEY, |doc: &mut DeviceNotes| {
                    doc.entry(symbol.clone()).or_default().insert(0, record.clone());
                })
                .await?;
            record
        }
    };

    if let Err(e) = watchlist::set_has_notes(backend, &symbol, true).await {
        tracing::warn!(error = %e, symbol = %symbol, "Failed to flag watchlist item with notes");
    }

    Ok(created)
}

pub async fn update(
    backend: Backend<'_>,
    symbol: &str,
    id: Uuid,
    patch: &StockNotePatch,
) -> anyhow::Result<Option<StockNote>> {
    let symbol = normalize_symbol(symbol);

    match backend {
        Backend::Remote { pool, owner } => {
            stock_note_repo::update_note(pool, owner, &symbol, id, patch).await
        }
        Backend::Device { store, device_id } => {
            store
                .update(device_id, STOCK_NOTES_KEY, |doc: &mut DeviceNotes| {
                    doc.get_mut(&symbol)
                        .and_then(|notes| notes.iter_mut().find(|n| n.id == id))
                        .map(|note| {
                            note.apply(patch, Utc::now());
                            note.clone()
                        })
                })
                .await
        }
    }
}

/// Delete a note; clears the watchlist flag when it was the symbol's last one.
pub async fn delete(backend: Backend<'_>, symbol: &str, id: Uuid) -> anyhow::Result<bool> {
    let symbol = normalize_symbol(symbol);

    let (deleted, remaining) = match backend {
        Backend::Remote { pool, owner } => {
            let deleted = stock_note_repo::delete_note(pool, owner, &symbol, id).await?;
            let remaining = stock_note_repo::count_notes_for_symbol(pool, owner, &symbol).await?;
            (deleted, remaining as usize)
        }
        Backend::Device { store, device_id } => {
            store
                .update(device_id, STOCK_NOTES_KEY, |doc: &mut DeviceNotes| {
                    let Some(notes) = doc.get_mut(&symbol) else {
                        return (false, 0);
                    };
                    let before = notes.len();
                    notes.retain(|n| n.id != id);
                    let remaining = notes.len();
                    if remaining == 0 {
                        doc.remove(&symbol);
                    }
                    (remaining != before, remaining)
                })
                .await?
        }
    };

    if deleted && remaining == 0 {
        if let Err(e) = watchlist::set_has_notes(backend, &symbol, false).await {
            tracing::warn!(error = %e, symbol = %symbol, "Failed to clear watchlist notes flag");
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotePosition;
    use crate::storage::DeviceStore;
    use serde_json::json;

    fn device(store: &DeviceStore) -> Backend<'_> {
        Backend::Device {
            store,
            device_id: "notes-device",
        }
    }

    #[tokio::test]
    async fn device_notes_lifecycle_tracks_watchlist_flag() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());
        watchlist::add(device(&store), "AAPL").await.unwrap();

        let first = create(device(&store), "aapl", &NewStockNote::default()).await.unwrap();
        assert_eq!(first.title, "New Note");

        let second = create(
            device(&store),
            "AAPL",
            &NewStockNote {
                title: Some("Earnings plan".into()),
                content: Some(json!([{ "content": [{ "text": "wait for the gap fill" }] }])),
                position: Some(NotePosition { x: 10.0, y: 20.0 }),
                size: None,
            },
        )
        .await
        .unwrap();

        // Newest first
        let notes = list_for_symbol(device(&store), "AAPL").await.unwrap();
        assert_eq!(notes[0].id, second.id);
        assert_eq!(notes.len(), 2);

        let items = watchlist::list(device(&store)).await.unwrap();
        assert!(items[0].has_notes);

        let patch = StockNotePatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let updated = update(device(&store), "AAPL", first.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");

        assert!(delete(device(&store), "AAPL", first.id).await.unwrap());
        assert!(watchlist::list(device(&store)).await.unwrap()[0].has_notes);

        assert!(delete(device(&store), "AAPL", second.id).await.unwrap());
        assert!(!watchlist::list(device(&store)).await.unwrap()[0].has_notes);
        assert!(list_all(device(&store)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_note_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());

        assert!(!delete(device(&store), "MSFT", Uuid::new_v4()).await.unwrap());
    }
}
