//! Application state for the HTTP server.

use crate::core::blocklist::{BlockList, SharedBlockList};
use crate::core::catalog::HospitalCatalog;
use crate::domain::ports::{ConfigProvider, Storage};
use std::sync::Arc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<HospitalCatalog>,
    /// Prefectures hidden from listings; lives as long as the process
    pub blocked: SharedBlockList,
    /// CSV file that new hospitals are appended to
    pub add_target: Option<String>,
}

impl AppState {
    pub fn new(
        catalog: Arc<HospitalCatalog>,
        blocked: SharedBlockList,
        add_target: Option<String>,
    ) -> Self {
        Self {
            catalog,
            blocked,
            add_target,
        }
    }

    /// Loads every configured CSV source and seeds the block list.
    pub async fn from_config<C: ConfigProvider>(config: &C, storage: Arc<dyn Storage>) -> Self {
        let catalog = HospitalCatalog::load(
            storage,
            config.csv_paths().to_vec(),
            config.extractor(),
        )
        .await;

        let initial: BlockList = config.initial_blocked().iter().cloned().collect();
        if !initial.is_empty() {
            tracing::info!("🚫 Starting with {} blocked prefectures", initial.len());
        }

        Self::new(
            Arc::new(catalog),
            SharedBlockList::new(initial),
            config.add_target().map(str::to_string),
        )
    }
}
