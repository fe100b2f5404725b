use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::db::journal_repo;
use crate::keyed_lock::{KeyedGuard, KeyedLocks};

/// Where debounced journal content ends up.
pub trait JournalSink: Send + Sync + 'static {
    fn save(
        &self,
        owner: Uuid,
        date: NaiveDate,
        content: Option<String>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct PgJournalSink {
    pool: PgPool,
}

impl PgJournalSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl JournalSink for PgJournalSink {
    fn save(
        &self,
        owner: Uuid,
        date: NaiveDate,
        content: Option<String>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send {
        let pool = self.pool.clone();
        async move {
            journal_repo::upsert_entry_for_date(&pool, owner, date, content.as_deref(), None).await?;
            Ok(())
        }
    }
}

pub type JournalAutosave = AutosaveScheduler<PgJournalSink>;

type DayKey = (Uuid, NaiveDate);

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
    /// Set once the sink call has started; the task is no longer aborted after that.
    writing: bool,
}

/// Per-(owner, day) cancel-and-reschedule timer. Each edit replaces the
/// pending write; only content left untouched for `delay` is persisted.
///
/// Writes for one day are serialized by a per-day lock, which an explicit
/// save takes through [`AutosaveScheduler::supersede`].
pub struct AutosaveScheduler<S> {
    sink: Arc<S>,
    delay: Duration,
    pending: Arc<Mutex<HashMap<DayKey, Pending>>>,
    writes: Arc<KeyedLocks<DayKey>>,
    generation: AtomicU64,
}

impl<S: JournalSink> AutosaveScheduler<S> {
    pub fn new(sink: S, delay: Duration) -> Self {
        Self {
            sink: Arc::new(sink),
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            writes: Arc::new(KeyedLocks::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Queue `content` for the day, replacing whatever was queued before.
    pub fn schedule(&self, owner: Uuid, date: NaiveDate, content: Option<String>) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let key = (owner, date);

        // Held across spawn + insert so the task cannot look itself up early.
        let mut pending = lock(&self.pending);
        if let Some(previous) = pending.remove(&key) {
            if !previous.writing {
                previous.handle.abort();
            }
        }

        let sink = Arc::clone(&self.sink);
        let registry = Arc::clone(&self.pending);
        let writes = Arc::clone(&self.writes);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _day = writes.lock(key).await;

            {
                let mut pending = lock(&registry);
                match pending.get_mut(&key) {
                    Some(p) if p.generation == generation => p.writing = true,
                    _ => return,
                }
            }

            let result = sink.save(owner, date, content).await;

            {
                let mut pending = lock(&registry);
                if pending.get(&key).is_some_and(|p| p.generation == generation) {
                    pending.remove(&key);
                }
            }

            match result {
                Ok(()) => {
                    metrics::counter!("journal_autosaves_total").increment(1);
                    tracing::debug!(owner = %owner, date = %date, "Journal autosaved");
                }
                Err(e) => {
                    tracing::error!(error = %e, owner = %owner, date = %date, "Journal autosave failed");
                }
            }
        });

        pending.insert(
            key,
            Pending {
                generation,
                handle,
                writing: false,
            },
        );
    }

    /// Drop the pending write for the day. Returns true if one was queued.
    /// A write already handed to the sink runs to completion.
    pub fn cancel(&self, owner: Uuid, date: NaiveDate) -> bool {
        match lock(&self.pending).remove(&(owner, date)) {
            Some(p) => {
                if !p.writing {
                    p.handle.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Cancel the pending write and wait out one already in flight. Until the
    /// returned guard drops, no draft for the day reaches the sink.
    pub async fn supersede(&self, owner: Uuid, date: NaiveDate) -> KeyedGuard<DayKey> {
        self.cancel(owner, date);
        self.writes.lock((owner, date)).await
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
