// Repository trait for spreadsheet data access
use crate::domain::credentials::ServiceAccountCredentials;
use crate::domain::source::SheetSource;
use crate::domain::table::SheetTable;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SheetError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("spreadsheet '{0}' not found, check the sheet ID and sharing permissions")]
    SpreadsheetNotFound(String),
    #[error("worksheet '{0}' not found")]
    WorksheetNotFound(String),
    #[error("spreadsheet request failed: {0}")]
    Request(String),
    #[error("unexpected spreadsheet response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait SheetRepository: Send + Sync {
    /// Read every row of the source's worksheet (the first one when none is named)
    async fn fetch_table(
        &self,
        credentials: &ServiceAccountCredentials,
        source: &SheetSource,
    ) -> Result<SheetTable, SheetError>;

    /// Cheap check that the credentials can obtain an access token
    async fn check_connection(&self, credentials: &ServiceAccountCredentials) -> Result<(), SheetError>;

    /// Drop cached rows for a service account; no-op for uncached repositories
    async fn invalidate(&self, _owner: &str) {}
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned tables keyed by sheet id; unknown ids are "not found"
    #[derive(Default)]
    pub struct InMemorySheetRepository {
        pub tables: HashMap<String, Result<SheetTable, SheetError>>,
        pub connection: Option<SheetError>,
        pub fetches: AtomicUsize,
    }

    impl InMemorySheetRepository {
        pub fn with_table(mut self, sheet_id: &str, table: SheetTable) -> Self {
            self.tables.insert(sheet_id.to_string(), Ok(table));
            self
        }

        pub fn with_error(mut self, sheet_id: &str, error: SheetError) -> Self {
            self.tables.insert(sheet_id.to_string(), Err(error));
            self
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SheetRepository for InMemorySheetRepository {
        async fn fetch_table(
            &self,
            _credentials: &ServiceAccountCredentials,
            source: &SheetSource,
        ) -> Result<SheetTable, SheetError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.tables
                .get(&source.sheet_id)
                .cloned()
                .unwrap_or_else(|| Err(SheetError::SpreadsheetNotFound(source.sheet_id.clone())))
        }

        async fn check_connection(&self, _credentials: &ServiceAccountCredentials) -> Result<(), SheetError> {
            match &self.connection {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }
}
