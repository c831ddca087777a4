//! Ingestion outcomes and their wire shapes.

use serde::{Deserialize, Serialize};

use crate::ingest::IngestError;

/// Which entry point handled the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Write-style entry point.
    Post,
    /// Read-style entry point; also answers liveness checks.
    Get,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Post => "POST",
            Channel::Get => "GET",
        }
    }

    fn saved_message(&self) -> String {
        format!("Data saved successfully via {}", self.as_str())
    }

    fn failed_message(&self) -> String {
        format!("Failed to save data via {}", self.as_str())
    }
}

/// JSON body returned for every request that attempted an append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum IngestReply {
    Success { row: u64, message: String },
    Error { error: String, message: String },
}

/// Result of handling one request. Never an `Err`: failures are a variant.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The handler was invoked without any request context.
    Diagnostic(String),
    /// Status check; nothing was appended.
    Liveness(String),
    /// A row was appended at this 1-based position.
    Saved { channel: Channel, row: u64 },
    /// Decoding or appending failed; nothing was appended.
    Failed { channel: Channel, error: IngestError },
}

impl IngestOutcome {
    /// The JSON reply, for outcomes that have one.
    pub fn reply(&self) -> Option<IngestReply> {
        match self {
            IngestOutcome::Saved { channel, row } => Some(IngestReply::Success {
                row: *row,
                message: channel.saved_message(),
            }),
            IngestOutcome::Failed { channel, error } => Some(IngestReply::Error {
                error: format!("Error: {}", error),
                message: channel.failed_message(),
            }),
            IngestOutcome::Diagnostic(_) | IngestOutcome::Liveness(_) => None,
        }
    }

    /// The plain-text body, for outcomes that are not JSON.
    pub fn text(&self) -> Option<&str> {
        match self {
            IngestOutcome::Diagnostic(text) | IngestOutcome::Liveness(text) => Some(text),
            _ => None,
        }
    }

    /// Label used for the request counter.
    pub fn label(&self) -> &'static str {
        match self {
            IngestOutcome::Diagnostic(_) => "diagnostic",
            IngestOutcome::Liveness(_) => "liveness",
            IngestOutcome::Saved { .. } => "saved",
            IngestOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, IngestOutcome::Saved { .. })
    }
}
