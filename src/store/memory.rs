//! In-process row store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::record::Row;
use crate::store::{RowStore, StoreError};

/// Keeps rows in memory. Used by tests and `self-test` runs.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Row>>,
    fail_appends: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored row, oldest first.
    pub async fn rows(&self) -> Vec<Row> {
        self.rows.lock().await.clone()
    }

    /// Make subsequent appends fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.fail_appends.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn append(&self, row: Row) -> Result<u64, StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("appends disabled".to_string()));
        }
        let mut rows = self.rows.lock().await;
        rows.push(row);
        Ok(rows.len() as u64)
    }

    async fn len(&self) -> Result<u64, StoreError> {
        Ok(self.rows.lock().await.len() as u64)
    }
}
