//! Append-only row storage.
//!
//! # Responsibilities
//! - Append one six-column row and report its 1-based position
//! - Report how many rows are stored
//!
//! # Design Decisions
//! - The ingestion handler only sees `dyn RowStore`; concrete stores are
//!   chosen at startup from config
//! - Stores serialize their own appends; callers never lock
//! - Rows are never read back, updated or deleted through this interface

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::record::Row;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised while appending to a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("row encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The one capability the ingestion handler needs from storage.
#[async_trait]
pub trait RowStore: Send + Sync + 'static {
    /// Append `row` after the last stored row and return its 1-based position.
    async fn append(&self, row: Row) -> Result<u64, StoreError>;

    /// Number of rows currently stored.
    async fn len(&self) -> Result<u64, StoreError>;
}

/// Open the store described by `config`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn RowStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; rows are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::File => {
            let store = FileStore::open(&config.path).await?;
            Ok(Arc::new(store))
        }
    }
}
