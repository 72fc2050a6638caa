use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use optistock_core::StockRecord;
use optistock_import::{normalize_payload, PayloadError, RecordSource, SourceError};
use optistock_storage::LocalCache;
use serde::Serialize;
use thiserror::Error;

use crate::state::{SharedState, StatusMessage};

pub const STATUS_LOADING: &str = "Cargando…";
pub const STATUS_READY: &str = "Listo";
pub const STATUS_FAILED: &str = "Error al cargar. Uso copia local si existe.";
pub const STATUS_LOCAL_ONLY: &str = "Sin URL de datos configurada. Uso datos locales.";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    Normal,
    /// Drop the cache before fetching.
    Force,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Another fetch was already running; nothing happened.
    Skipped,
    Fetched { records: usize },
    /// The fetch failed and the cached copy was loaded instead.
    FromCache { records: usize },
    /// The fetch failed and there was no usable cache.
    Empty,
    /// No source is configured; the current records were kept.
    Unchanged { records: usize },
}

/// Clears the in-flight flag however the fetch ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives refreshes against the remote sheet and keeps the cache and the
/// application state in step.
///
/// At most one fetch runs at a time; a fetch requested while another is
/// outstanding is dropped, not queued. Fetches cannot be cancelled.
pub struct Orchestrator<S> {
    source: S,
    cache: LocalCache,
    state: SharedState,
    in_flight: AtomicBool,
    failsafe: Duration,
}

impl<S: RecordSource + 'static> Orchestrator<S> {
    pub fn new(source: S, cache: LocalCache, state: SharedState, failsafe: Duration) -> Arc<Self> {
        Arc::new(Self {
            source,
            cache,
            state,
            in_flight: AtomicBool::new(false),
            failsafe,
        })
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Show the cached copy, if still fresh, before any network traffic.
    pub async fn load_cached(&self) -> bool {
        match self.cache.read().await {
            Some(entry) => {
                let saved_at = entry.saved_at();
                let count = entry.records.len();
                self.state.lock().await.replace_records(entry.records, saved_at);
                tracing::info!(records = count, "loaded cached stock");
                true
            }
            None => false,
        }
    }

    /// Start-up sequence: cached copy first, then a refresh.
    pub async fn startup(self: &Arc<Self>) -> FetchOutcome {
        self.load_cached().await;
        self.fetch_all(RefreshMode::Normal).await
    }

    /// Fetch in a task of its own and wait for the outcome. Dropping the
    /// returned future detaches the fetch; it still runs to completion and
    /// applies its result.
    pub async fn fetch_all(self: &Arc<Self>, mode: RefreshMode) -> FetchOutcome {
        self.spawn_fetch(mode, false).await
    }

    /// Background refresh tick: show the cache timestamp, then refresh.
    /// Both steps are skipped while another fetch is in flight.
    pub async fn on_refresh_tick(self: &Arc<Self>) -> FetchOutcome {
        self.spawn_fetch(RefreshMode::Normal, true).await
    }

    async fn spawn_fetch(self: &Arc<Self>, mode: RefreshMode, show_cache_sync: bool) -> FetchOutcome {
        let this = Arc::clone(self);
        match tokio::spawn(async move { this.run_fetch(mode, show_cache_sync).await }).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::warn!("fetch task cancelled: {e}");
                FetchOutcome::Skipped
            }
        }
    }

    async fn run_fetch(self: &Arc<Self>, mode: RefreshMode, show_cache_sync: bool) -> FetchOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("fetch already in flight, skipping");
            return FetchOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.in_flight);

        if show_cache_sync {
            if let Some(saved_at) = self.cache.read().await.and_then(|e| e.saved_at()) {
                self.state.lock().await.last_sync = Some(saved_at);
            }
        }
        if mode == RefreshMode::Force {
            self.cache.invalidate().await;
        }

        {
            let mut state = self.state.lock().await;
            state.begin_loading();
            state.status = StatusMessage::info(STATUS_LOADING);
        }
        self.arm_failsafe();

        let outcome = match self.fetch_records().await {
            Ok(records) => {
                let count = records.len();
                let now = Utc::now();
                self.cache.write_at(&records, now).await;
                let mut state = self.state.lock().await;
                state.replace_records(records, Some(now));
                state.status = StatusMessage::info(STATUS_READY);
                tracing::info!(records = count, "stock refreshed");
                FetchOutcome::Fetched { records: count }
            }
            Err(e) => self.fall_back(e).await,
        };

        self.state.lock().await.end_loading();
        outcome
    }

    /// Cached copy if there is one. Otherwise an empty set, except when no
    /// source is configured: then imported records stay as they are.
    async fn fall_back(&self, error: FetchError) -> FetchOutcome {
        let local_only = matches!(error, FetchError::Source(SourceError::NotConfigured));
        if local_only {
            tracing::debug!("no source configured, keeping local stock");
        } else {
            tracing::warn!("fetch failed: {error}");
        }
        let cached = self.cache.read().await;
        let mut state = self.state.lock().await;
        state.status = if local_only {
            StatusMessage::info(STATUS_LOCAL_ONLY)
        } else {
            StatusMessage::error(STATUS_FAILED)
        };
        match cached {
            Some(entry) => {
                let count = entry.records.len();
                let saved_at = entry.saved_at();
                state.replace_records(entry.records, saved_at);
                tracing::info!(records = count, "serving cached stock");
                FetchOutcome::FromCache { records: count }
            }
            None if local_only => FetchOutcome::Unchanged {
                records: state.inventory.len(),
            },
            None => {
                state.replace_records(Vec::new(), None);
                FetchOutcome::Empty
            }
        }
    }

    async fn fetch_records(&self) -> Result<Vec<StockRecord>, FetchError> {
        let payload = self.source.fetch_all().await?;
        let normalized = normalize_payload(&payload)?;
        tracing::debug!(
            seen = normalized.stats.rows_seen,
            kept = normalized.stats.rows_kept,
            "normalized payload"
        );
        Ok(normalized.records)
    }

    /// Replace the record set from a local import and persist it.
    pub async fn ingest(&self, records: Vec<StockRecord>) {
        let now = Utc::now();
        self.cache.write_at(&records, now).await;
        let count = records.len();
        let mut state = self.state.lock().await;
        state.replace_records(records, Some(now));
        state.status = StatusMessage::info(STATUS_READY);
        tracing::info!(records = count, "imported stock");
    }

    /// Loading-indicator failsafe. Idempotent; never touches the fetch.
    pub async fn on_failsafe_elapsed(&self) {
        let mut state = self.state.lock().await;
        if state.is_loading() {
            tracing::warn!("loading failsafe fired before the fetch settled");
            state.clear_loading();
        }
    }

    fn arm_failsafe(self: &Arc<Self>) {
        let this = Arc::downgrade(self);
        let delay = self.failsafe;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(this) = this.upgrade() {
                this.on_failsafe_elapsed().await;
            }
        });
    }
}
