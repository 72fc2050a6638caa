use std::sync::Arc;

use chrono::{DateTime, Utc};
use optistock_core::StockRecord;
use optistock_query::{Inventory, SortState};
use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Error,
        }
    }
}

/// Everything the viewer shows, owned in one place.
///
/// Only the fetch orchestrator replaces records; HTTP handlers read them and
/// mutate the sort state.
#[derive(Debug)]
pub struct AppState {
    pub inventory: Inventory,
    pub sort: SortState,
    pub last_sync: Option<DateTime<Utc>>,
    pub status: StatusMessage,
    loading: u32,
}

pub type SharedState = Arc<Mutex<AppState>>;

impl Default for AppState {
    fn default() -> Self {
        Self {
            inventory: Inventory::default(),
            sort: SortState::default(),
            last_sync: None,
            status: StatusMessage::info(""),
            loading: 0,
        }
    }
}

impl AppState {
    pub fn shared() -> SharedState {
        Arc::new(Mutex::new(AppState::default()))
    }

    /// Swap in a whole new record set; there is no incremental merge.
    pub fn replace_records(&mut self, records: Vec<StockRecord>, synced_at: Option<DateTime<Utc>>) {
        self.inventory = Inventory::new(records);
        self.last_sync = synced_at;
    }

    pub fn begin_loading(&mut self) {
        self.loading += 1;
    }

    pub fn end_loading(&mut self) {
        self.loading = self.loading.saturating_sub(1);
    }

    pub fn clear_loading(&mut self) {
        self.loading = 0;
    }

    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_counter_saturates() {
        let mut s = AppState::default();
        s.begin_loading();
        s.begin_loading();
        s.end_loading();
        assert!(s.is_loading());
        s.clear_loading();
        assert!(!s.is_loading());
        s.end_loading();
        assert!(!s.is_loading());
    }

    #[test]
    fn replace_records_rebuilds_inventory() {
        let mut s = AppState::default();
        let now = Utc::now();
        s.replace_records(
            vec![StockRecord {
                n_anteojo: "1".into(),
                ..StockRecord::default()
            }],
            Some(now),
        );
        assert_eq!(s.inventory.len(), 1);
        assert_eq!(s.last_sync, Some(now));
        s.replace_records(Vec::new(), None);
        assert!(s.inventory.is_empty());
        assert_eq!(s.last_sync, None);
    }
}
