pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod importer;
pub mod jarvis;
pub mod keyed_lock;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::jarvis::LlmClient;
use crate::services::journal_autosave::{JournalAutosave, PgJournalSink};
use crate::storage::DeviceStore;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub device_store: Arc<DeviceStore>,
    pub llm: Option<Arc<LlmClient>>,
    pub autosave: Arc<JournalAutosave>,
}

impl AppState {
    /// Wire the shared services from config. Jarvis stays disabled without an API key.
    pub fn new(
        db: sqlx::PgPool,
        config: AppConfig,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let device_store = Arc::new(DeviceStore::new(config.device_store_dir.clone()));
        let llm = LlmClient::from_config(&config).map(Arc::new);
        let autosave = Arc::new(JournalAutosave::new(
            PgJournalSink::new(db.clone()),
            Duration::from_millis(config.journal_autosave_ms),
        ));

        Self {
            db,
            config,
            metrics_handle,
            device_store,
            llm,
            autosave,
        }
    }
}
