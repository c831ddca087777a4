//! Server-side ingestion subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → request.rs (body vs. parameters, transport-neutral)
//!     → decoder.rs (raw JSON → packed `data` field → discrete fields)
//!     → handler.rs (append via RowStore, liveness heuristic)
//!     → reply.rs (JSON success/error, or plain text)
//! ```

pub mod decoder;
pub mod handler;
pub mod reply;
pub mod request;

use thiserror::Error;

use crate::store::StoreError;

pub use decoder::{default_decoders, RecordDecoder};
pub use handler::Ingestor;
pub use reply::{Channel, IngestOutcome, IngestReply};
pub use request::{InboundRequest, Parameters};

/// Why a request could not be turned into an appended row.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no data received in request")]
    DataAbsent,

    #[error("unreadable request body: {0}")]
    Body(String),

    #[error("request body exceeds the size limit")]
    TooLarge,

    #[error("request timed out")]
    TimedOut,

    #[error("malformed JSON payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("append failed: {0}")]
    Store(#[from] StoreError),
}
