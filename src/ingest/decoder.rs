//! Payload decoders, tried in precedence order.
//!
//! Each decoder answers two questions at once: does this request look like my
//! encoding, and if so, what record (or parse error) does it carry. The
//! ingestion handler walks the list and the first decoder that matches wins;
//! a parse error from a matching decoder is final and later decoders are not
//! consulted.

use crate::ingest::request::InboundRequest;
use crate::ingest::IngestError;
use crate::record::{Record, Timestamper};

/// Form field holding a whole JSON-encoded record.
pub const PACKED_FIELD: &str = "data";

/// One recognized payload encoding.
pub trait RecordDecoder: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// `None` if the request is not in this encoding.
    fn decode(
        &self,
        request: &InboundRequest,
        clock: &Timestamper,
    ) -> Option<Result<Record, IngestError>>;
}

/// A raw body holding a JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawJsonBody;

impl RecordDecoder for RawJsonBody {
    fn name(&self) -> &'static str {
        "raw_json"
    }

    fn decode(&self, request: &InboundRequest, _clock: &Timestamper) -> Option<Result<Record, IngestError>> {
        let body = request.raw_body()?;
        Some(Record::from_json(body).map_err(IngestError::from))
    }
}

/// A single `data` form field whose value is a JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackedField;

impl RecordDecoder for PackedField {
    fn name(&self) -> &'static str {
        "packed_field"
    }

    fn decode(&self, request: &InboundRequest, _clock: &Timestamper) -> Option<Result<Record, IngestError>> {
        let packed = request.parameters.first(PACKED_FIELD)?;
        Some(Record::from_json(packed).map_err(IngestError::from))
    }
}

/// Discrete `name`, `phone`, `email`, `company`, `message` and `timestamp`
/// parameters. Any non-empty parameter set matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscreteFields;

impl DiscreteFields {
    /// Build a record from whatever named parameters are present.
    pub fn record_from(request: &InboundRequest, clock: &Timestamper) -> Record {
        let params = &request.parameters;
        let field = |name: &str| params.first(name).unwrap_or_default().to_string();

        Record {
            name: field("name"),
            phone: field("phone"),
            email: field("email"),
            company: field("company"),
            message: field("message"),
            timestamp: params
                .first("timestamp")
                .filter(|ts| !ts.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| clock.now()),
        }
    }
}

impl RecordDecoder for DiscreteFields {
    fn name(&self) -> &'static str {
        "discrete_fields"
    }

    fn decode(&self, request: &InboundRequest, clock: &Timestamper) -> Option<Result<Record, IngestError>> {
        if request.parameters.is_empty() {
            return None;
        }
        Some(Ok(Self::record_from(request, clock)))
    }
}

/// The write-path decoders in precedence order.
pub fn default_decoders() -> Vec<Box<dyn RecordDecoder>> {
    vec![
        Box::new(RawJsonBody),
        Box::new(PackedField),
        Box::new(DiscreteFields),
    ]
}
