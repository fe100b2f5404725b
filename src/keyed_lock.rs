use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Cells<K> = Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>;

/// One async lock per key. Holders of different keys never wait on each
/// other; a key's entry is dropped once nobody holds or waits for it.
pub struct KeyedLocks<K> {
    cells: Cells<K>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            cells: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: K) -> KeyedGuard<K> {
        let cell = Arc::clone(lock_cells(&self.cells).entry(key.clone()).or_default());
        let guard = cell.lock_owned().await;

        KeyedGuard {
            cells: Arc::clone(&self.cells),
            key,
            guard: Some(guard),
        }
    }

    /// Keys currently held or awaited.
    pub fn len(&self) -> usize {
        lock_cells(&self.cells).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> std::fmt::Debug for KeyedLocks<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedLocks").finish_non_exhaustive()
    }
}

#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyedGuard<K: Eq + Hash> {
    cells: Cells<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash> Drop for KeyedGuard<K> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Waiters hold a clone of the cell, so a count of one means the map is the last owner.
        let mut cells = lock_cells(&self.cells);
        if cells.get(&self.key).is_some_and(|cell| Arc::strong_count(cell) == 1) {
            cells.remove(&self.key);
        }
    }
}

fn lock_cells<K>(cells: &Mutex<HashMap<K, Arc<AsyncMutex<()>>>>) -> MutexGuard<'_, HashMap<K, Arc<AsyncMutex<()>>>> {
    cells.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let first = locks.lock("dev-1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("dev-1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("dev-1").await;

        let b = tokio::time::timeout(Duration::from_millis(50), locks.lock("dev-2")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn released_keys_are_forgotten() {
        let locks = KeyedLocks::new();
        for i in 0..10 {
            let _guard = locks.lock(i).await;
        }
        assert!(locks.is_empty());
    }
}
