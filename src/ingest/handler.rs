//! The ingestion handler.
//!
//! # State machine (per request, nothing carried between requests)
//! ```text
//! POST:
//!     no request context        → Diagnostic
//!     first matching decoder    → Record → append → Saved
//!     no decoder matches        → Failed(DataAbsent)
//!     parse / store error       → Failed
//!
//! GET:
//!     no request context        → Diagnostic
//!     no parameters             → Liveness
//!     no name / email / message → Liveness
//!     otherwise                 → discrete fields → append → Saved | Failed
//! ```

use std::sync::Arc;

use crate::ingest::decoder::{default_decoders, DiscreteFields, RecordDecoder};
use crate::ingest::reply::{Channel, IngestOutcome};
use crate::ingest::request::InboundRequest;
use crate::ingest::IngestError;
use crate::observability::metrics;
use crate::record::{Record, Row, Timestamper};
use crate::store::RowStore;

/// Turns inbound requests into appended rows.
pub struct Ingestor {
    store: Arc<dyn RowStore>,
    decoders: Vec<Box<dyn RecordDecoder>>,
    clock: Timestamper,
}

impl Ingestor {
    /// Handler using the standard decoder precedence.
    pub fn new(store: Arc<dyn RowStore>, clock: Timestamper) -> Self {
        Self::with_decoders(store, clock, default_decoders())
    }

    pub fn with_decoders(
        store: Arc<dyn RowStore>,
        clock: Timestamper,
        decoders: Vec<Box<dyn RecordDecoder>>,
    ) -> Self {
        Self {
            store,
            decoders,
            clock,
        }
    }

    /// Write-style entry point.
    pub async fn handle_post(&self, request: Option<&InboundRequest>) -> IngestOutcome {
        let outcome = match request {
            None => {
                tracing::info!("POST handler invoked without a request context");
                IngestOutcome::Diagnostic(
                    "POST handler invoked without a request context. This is expected when testing."
                        .to_string(),
                )
            }
            Some(request) => match self.decode_and_save(request).await {
                Ok(row) => IngestOutcome::Saved {
                    channel: Channel::Post,
                    row,
                },
                Err(error) => {
                    tracing::warn!(error = %error, "POST ingestion failed");
                    IngestOutcome::Failed {
                        channel: Channel::Post,
                        error,
                    }
                }
            },
        };

        metrics::record_request("post", outcome.label());
        outcome
    }

    /// Read-style entry point. Doubles as a liveness check.
    pub async fn handle_get(&self, request: Option<&InboundRequest>) -> IngestOutcome {
        let outcome = match request {
            None => {
                tracing::info!("GET handler invoked without a request context");
                IngestOutcome::Diagnostic(
                    "GET handler invoked without a request context. This is expected when testing."
                        .to_string(),
                )
            }
            Some(request) if request.parameters.is_empty() => {
                IngestOutcome::Liveness(self.liveness())
            }
            Some(request) => {
                let record = DiscreteFields::record_from(request, &self.clock);
                if !record.has_contact_content() {
                    // TODO: confirm whether phone/company-only submissions should be kept
                    tracing::debug!(
                        parameters = ?request.parameters.names().collect::<Vec<_>>(),
                        "GET without name/email/message treated as status check"
                    );
                    IngestOutcome::Liveness(self.liveness())
                } else {
                    match self.append_record(&record).await {
                        Ok(row) => IngestOutcome::Saved {
                            channel: Channel::Get,
                            row,
                        },
                        Err(error) => {
                            tracing::warn!(error = %error, "GET ingestion failed");
                            IngestOutcome::Failed {
                                channel: Channel::Get,
                                error,
                            }
                        }
                    }
                }
            }
        };

        metrics::record_request("get", outcome.label());
        outcome
    }

    /// Run the decoders in order and return the first match.
    pub fn decode(&self, request: &InboundRequest) -> Result<Record, IngestError> {
        for decoder in &self.decoders {
            if let Some(result) = decoder.decode(request, &self.clock) {
                tracing::debug!(decoder = decoder.name(), "Payload decoder matched");
                metrics::record_decoder_match(decoder.name());
                return result;
            }
        }
        Err(IngestError::DataAbsent)
    }

    /// Append `record` as a new row and return its position.
    pub async fn append_record(&self, record: &Record) -> Result<u64, IngestError> {
        let row = Row::from_record(record, &self.clock);
        tracing::debug!(row = ?row.named().collect::<Vec<_>>(), "Appending row");

        let result = self.store.append(row).await;
        metrics::record_append(result.is_ok());

        let position = result?;
        tracing::info!(row = position, "Row appended");
        Ok(position)
    }

    /// Status line returned to liveness checks.
    pub fn liveness(&self) -> String {
        format!("Lead intake is running! Current time: {}", self.clock.now())
    }

    async fn decode_and_save(&self, request: &InboundRequest) -> Result<u64, IngestError> {
        let record = self.decode(request)?;
        self.append_record(&record).await
    }
}
