//! Request shapes the submission chain can send.

use reqwest::Method;
use url::Url;

use crate::ingest::decoder::PACKED_FIELD;
use crate::record::Record;
use crate::submit::transport::TransportError;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundBody {
    Empty,
    /// `multipart/form-data` text fields.
    Multipart(Vec<(String, String)>),
    /// Serialized JSON sent as `application/json`.
    Json(String),
}

/// A transport-neutral request, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub body: OutboundBody,
}

/// One way of putting a record on the wire.
pub trait Encoding: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    fn encode(&self, endpoint: &Url, record: &Record) -> Result<OutboundRequest, TransportError>;
}

fn record_pairs(record: &Record) -> [(&'static str, &str); 6] {
    [
        ("name", record.name.as_str()),
        ("phone", record.phone.as_str()),
        ("email", record.email.as_str()),
        ("company", record.company.as_str()),
        ("message", record.message.as_str()),
        ("timestamp", record.timestamp.as_str()),
    ]
}

/// Every field as a query parameter on a GET.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryParams;

impl Encoding for QueryParams {
    fn name(&self) -> &'static str {
        "query_params"
    }

    fn encode(&self, endpoint: &Url, record: &Record) -> Result<OutboundRequest, TransportError> {
        let mut url = endpoint.clone();
        url.query_pairs_mut().extend_pairs(record_pairs(record));

        Ok(OutboundRequest {
            method: Method::GET,
            url,
            body: OutboundBody::Empty,
        })
    }
}

/// The whole record, JSON-encoded, in a single `data` multipart field.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackedMultipart;

impl Encoding for PackedMultipart {
    fn name(&self) -> &'static str {
        "packed_multipart"
    }

    fn encode(&self, endpoint: &Url, record: &Record) -> Result<OutboundRequest, TransportError> {
        let packed = serde_json::to_string(record)?;

        Ok(OutboundRequest {
            method: Method::POST,
            url: endpoint.clone(),
            body: OutboundBody::Multipart(vec![(PACKED_FIELD.to_string(), packed)]),
        })
    }
}

/// The record as a JSON body.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBody;

impl Encoding for JsonBody {
    fn name(&self) -> &'static str {
        "json_body"
    }

    fn encode(&self, endpoint: &Url, record: &Record) -> Result<OutboundRequest, TransportError> {
        Ok(OutboundRequest {
            method: Method::POST,
            url: endpoint.clone(),
            body: OutboundBody::Json(serde_json::to_string(record)?),
        })
    }
}

/// The fallback order used for opaque delivery.
pub fn default_chain() -> Vec<Box<dyn Encoding>> {
    vec![
        Box::new(QueryParams),
        Box::new(PackedMultipart),
        Box::new(JsonBody),
    ]
}
