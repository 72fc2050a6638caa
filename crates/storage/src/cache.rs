use chrono::{DateTime, Duration, TimeZone, Utc};
use optistock_core::StockRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{self, DbPool};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("Corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The last good record set, stamped with the time it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub records: Vec<StockRecord>,
}

impl CacheEntry {
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    fn age_at(&self, now: DateTime<Utc>) -> Duration {
        Duration::milliseconds(now.timestamp_millis() - self.timestamp)
    }
}

/// Single-slot record cache with a time-to-live.
///
/// Every operation fails soft: storage and decoding problems are logged and
/// reported as "no cache" (reads) or silently skipped (writes).
#[derive(Clone)]
pub struct LocalCache {
    pool: DbPool,
    key: String,
    ttl: Duration,
}

impl LocalCache {
    pub fn new(pool: DbPool, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            pool,
            key: key.into(),
            ttl,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn read(&self) -> Option<CacheEntry> {
        self.read_at(Utc::now()).await
    }

    /// Entry if present, decodable, and younger than the TTL at `now`.
    pub async fn read_at(&self, now: DateTime<Utc>) -> Option<CacheEntry> {
        let entry = match self.try_read().await {
            Ok(entry) => entry?,
            Err(e) => {
                tracing::warn!(key = %self.key, "cache read failed: {e}");
                return None;
            }
        };
        if entry.age_at(now) >= self.ttl {
            tracing::debug!(key = %self.key, "cache entry expired");
            return None;
        }
        Some(entry)
    }

    pub async fn write(&self, records: &[StockRecord]) {
        self.write_at(records, Utc::now()).await
    }

    pub async fn write_at(&self, records: &[StockRecord], now: DateTime<Utc>) {
        if let Err(e) = self.try_write(records, now).await {
            tracing::warn!(key = %self.key, "cache write failed: {e}");
        }
    }

    pub async fn invalidate(&self) {
        if let Err(e) = db::delete_value(&self.pool, &self.key).await {
            tracing::warn!(key = %self.key, "cache invalidate failed: {e}");
        }
    }

    async fn try_read(&self) -> Result<Option<CacheEntry>, CacheError> {
        match db::get_value(&self.pool, &self.key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn try_write(&self, records: &[StockRecord], now: DateTime<Utc>) -> Result<(), CacheError> {
        #[derive(Serialize)]
        struct EntryRef<'a> {
            timestamp: i64,
            records: &'a [StockRecord],
        }
        let blob = serde_json::to_string(&EntryRef {
            timestamp: now.timestamp_millis(),
            records,
        })?;
        db::put_value(&self.pool, &self.key, &blob).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_db;

    fn records() -> Vec<StockRecord> {
        vec![
            StockRecord {
                n_anteojo: "101".to_string(),
                marca: "Ray-Ban".to_string(),
                precio: "1.500".to_string(),
                ..StockRecord::default()
            },
            StockRecord {
                n_anteojo: "102".to_string(),
                fecha_venta: "5/3/24".to_string(),
                ..StockRecord::default()
            },
        ]
    }

    async fn cache(ttl_minutes: i64) -> LocalCache {
        let pool = create_memory_db().await.unwrap();
        LocalCache::new(pool, "stock_test", Duration::minutes(ttl_minutes))
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let cache = cache(30).await;
        let now = Utc::now();
        cache.write_at(&records(), now).await;
        let entry = cache.read_at(now + Duration::minutes(1)).await.unwrap();
        assert_eq!(entry.records, records());
        assert_eq!(entry.timestamp, now.timestamp_millis());
        assert_eq!(entry.saved_at().unwrap().timestamp_millis(), now.timestamp_millis());
    }

    #[tokio::test]
    async fn missing_entry_reads_none() {
        assert!(cache(30).await.read().await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_reads_none() {
        let cache = cache(15).await;
        let now = Utc::now();
        cache.write_at(&records(), now).await;
        assert!(cache.read_at(now + Duration::minutes(14)).await.is_some());
        assert!(cache.read_at(now + Duration::minutes(15)).await.is_none());
        assert!(cache.read_at(now + Duration::hours(2)).await.is_none());
    }

    #[tokio::test]
    async fn corrupt_entry_reads_none() {
        let cache = cache(30).await;
        db::put_value(&cache.pool, cache.key(), "{not json").await.unwrap();
        assert!(cache.read().await.is_none());
        db::put_value(&cache.pool, cache.key(), r#"{"records": []}"#).await.unwrap();
        assert!(cache.read().await.is_none());
    }

    #[tokio::test]
    async fn newer_write_supersedes() {
        let cache = cache(30).await;
        let now = Utc::now();
        cache.write_at(&records(), now).await;
        cache.write_at(&records()[..1], now + Duration::minutes(2)).await;
        let entry = cache.read_at(now + Duration::minutes(3)).await.unwrap();
        assert_eq!(entry.records.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = cache(30).await;
        cache.write(&records()).await;
        cache.invalidate().await;
        assert!(cache.read().await.is_none());
    }

    #[tokio::test]
    async fn closed_storage_fails_soft() {
        let cache = cache(30).await;
        cache.pool.close().await;
        cache.write(&records()).await;
        assert!(cache.read().await.is_none());
        cache.invalidate().await;
    }
}
