// TTL cache in front of any sheet repository
use crate::application::sheet_repository::{SheetError, SheetRepository};
use crate::domain::credentials::ServiceAccountCredentials;
use crate::domain::source::SheetSource;
use crate::domain::table::SheetTable;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    table: SheetTable,
    fetched_at: Instant,
}

/// Only successful, non-empty reads are cached. Entries belong to a credential
/// fingerprint, so a different key for the same account misses.
pub struct CachedSheetRepository {
    inner: Arc<dyn SheetRepository>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl CachedSheetRepository {
    pub fn new(inner: Arc<dyn SheetRepository>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn key(owner: &str, source: &SheetSource) -> String {
        format!("{}/{}", owner, source.cache_key())
    }

    #[cfg(test)]
    pub async fn cached_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SheetRepository for CachedSheetRepository {
    async fn fetch_table(
        &self,
        credentials: &ServiceAccountCredentials,
        source: &SheetSource,
    ) -> Result<SheetTable, SheetError> {
        let key = Self::key(&credentials.fingerprint(), source);

        if let Some(entry) = self.entries.read().await.get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                tracing::debug!("Cache hit for {}", key);
                return Ok(entry.table.clone());
            }
        }

        let table = self.inner.fetch_table(credentials, source).await?;
        if !table.is_empty() {
            self.entries.write().await.insert(
                key,
                CacheEntry {
                    table: table.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(table)
    }

    async fn check_connection(&self, credentials: &ServiceAccountCredentials) -> Result<(), SheetError> {
        self.inner.check_connection(credentials).await
    }

    async fn invalidate(&self, owner: &str) {
        let prefix = format!("{}/", owner);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        tracing::info!("Cleared {} cached sheets", before - entries.len());
    }
}
