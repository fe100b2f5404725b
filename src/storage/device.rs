use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::keyed_lock::KeyedLocks;

pub const WATCHLIST_KEY: &str = "cosy_watchlist";
pub const STOCK_NOTES_KEY: &str = "cosy_stock_notes";

/// Per-device JSON documents for callers without an account.
///
/// Layout on disk: `<root>/<device_id>/<key>.json`. Writes go through a temp
/// file and a rename so a crash never leaves a half-written document.
/// Each device has its own lock; devices never wait on one another.
#[derive(Debug)]
pub struct DeviceStore {
    root: PathBuf,
    locks: KeyedLocks<String>,
}

impl DeviceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyedLocks::new(),
        }
    }

    /// Read a document. Missing or unreadable documents read as `T::default()`.
    pub async fn load<T>(&self, device_id: &str, key: &str) -> anyhow::Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let _guard = self.locks.lock(device_id.to_string()).await;
        self.read_unlocked(device_id, key).await
    }

    /// Read-modify-write a document under the device's lock.
    pub async fn update<T, R, F>(&self, device_id: &str, key: &str, f: F) -> anyhow::Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.locks.lock(device_id.to_string()).await;
        let mut doc: T = self.read_unlocked(device_id, key).await?;
        let result = f(&mut doc);
        self.write_unlocked(device_id, key, &doc).await?;
        Ok(result)
    }

    fn path_for(&self, device_id: &str, key: &str) -> PathBuf {
        self.root.join(device_id).join(format!("{key}.json"))
    }

    async fn read_unlocked<T>(&self, device_id: &str, key: &str) -> anyhow::Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path_for(device_id, key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    device_id,
                    key,
                    "Unreadable device document, starting empty"
                );
                Ok(T::default())
            }
        }
    }

    async fn write_unlocked<T: Serialize>(&self, device_id: &str, key: &str, doc: &T) -> anyhow::Result<()> {
        let path = self.path_for(device_id, key);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec(doc)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn missing_document_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());

        let doc: Vec<String> = store.load("dev-1", WATCHLIST_KEY).await.unwrap();
        assert!(doc.is_empty());
    }

    #[tokio::test]
    async fn update_persists_between_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());

        store
            .update("dev-1", WATCHLIST_KEY, |doc: &mut Vec<String>| doc.push("AAPL".into()))
            .await
            .unwrap();

        let doc: Vec<String> = store.load("dev-1", WATCHLIST_KEY).await.unwrap();
        assert_eq!(doc, vec!["AAPL".to_string()]);

        // Devices are isolated from each other
        let other: Vec<String> = store.load("dev-2", WATCHLIST_KEY).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn corrupt_document_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());
        let path = dir.path().join("dev-1").join(format!("{STOCK_NOTES_KEY}.json"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{ definitely not json").unwrap();

        let doc: BTreeMap<String, Vec<String>> = store.load("dev-1", STOCK_NOTES_KEY).await.unwrap();
        assert!(doc.is_empty());
    }

    #[tokio::test]
    async fn concurrent_updates_on_one_device_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(DeviceStore::new(dir.path()));

        let mut tasks = Vec::new();
        for i in 0..20 {
            let store = std::sync::Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .update("dev-1", WATCHLIST_KEY, |doc: &mut Vec<String>| doc.push(format!("S{i}")))
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let doc: Vec<String> = store.load("dev-1", WATCHLIST_KEY).await.unwrap();
        assert_eq!(doc.len(), 20);
        assert!(store.locks.is_empty());
    }

    #[tokio::test]
    async fn busy_device_does_not_block_another() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceStore::new(dir.path());
        let _held = store.locks.lock("dev-1".to_string()).await;

        let other = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            store.update("dev-2", WATCHLIST_KEY, |doc: &mut Vec<String>| doc.push("AAPL".into())),
        )
        .await;
        assert!(other.is_ok());
    }
}
