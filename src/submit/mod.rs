//! Client-side submission of contact records.
//!
//! # Data Flow
//! ```text
//! Record (form fields)
//!     → stamp timestamp if missing
//!     → opaque:    query GET → multipart POST → JSON POST (advance only on transport error)
//!       confirmed: JSON POST, reply read and checked
//!     → SubmitOutcome { success, localized message }
//! ```
//!
//! # Design Decisions
//! - In opaque mode "success" means a request was dispatched, not that a row
//!   was written; the endpoint's responses are treated as unreadable
//! - Steps run one at a time; no step is retried and no timeout is imposed
//! - Error detail goes to the log, never into the returned message

pub mod encoding;
pub mod transport;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::{DeliveryMode, IntakeConfig, MessagesConfig};
use crate::ingest::IngestReply;
use crate::observability::metrics;
use crate::record::{Record, Timestamper};

pub use encoding::{default_chain, Encoding, JsonBody, OutboundBody, OutboundRequest};
pub use transport::{Dispatched, HttpTransport, Transport, TransportError};

/// Why a submission was reported as failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("submission endpoint is not configured")]
    NotConfigured,

    #[error("all {attempts} encodings failed, last error: {last}")]
    Exhausted { attempts: usize, last: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("endpoint rejected submission (status {status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// What the form shows after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub success: bool,
    pub message: String,
}

/// Delivers records to the ingestion endpoint.
pub struct SubmissionChain {
    endpoint: Option<Url>,
    mode: DeliveryMode,
    encodings: Vec<Box<dyn Encoding>>,
    transport: Arc<dyn Transport>,
    messages: MessagesConfig,
    clock: Timestamper,
}

impl SubmissionChain {
    /// Opaque chain with default encodings and messages.
    pub fn new(endpoint: Option<Url>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            mode: DeliveryMode::Opaque,
            encodings: default_chain(),
            transport,
            messages: MessagesConfig::default(),
            clock: Timestamper::default(),
        }
    }

    /// Build from config. An unparsable endpoint is logged and treated as unset.
    pub fn from_config(config: &IntakeConfig, transport: Arc<dyn Transport>) -> Self {
        let endpoint = config
            .client
            .endpoint_url
            .as_deref()
            .and_then(|raw| match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::error!(endpoint = %raw, error = %e, "Invalid submission endpoint");
                    None
                }
            });

        Self::new(endpoint, transport)
            .with_mode(config.client.mode)
            .with_messages(config.client.messages.clone())
            .with_clock(Timestamper::from_config(&config.record))
    }

    pub fn with_mode(mut self, mode: DeliveryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_messages(mut self, messages: MessagesConfig) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_clock(mut self, clock: Timestamper) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_encodings(mut self, encodings: Vec<Box<dyn Encoding>>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Submit `record`, reporting a user-facing outcome.
    pub async fn submit(&self, record: &Record) -> SubmitOutcome {
        let Some(endpoint) = &self.endpoint else {
            tracing::error!(error = %SubmitError::NotConfigured, "Submission skipped");
            return self.outcome(false, &self.messages.not_configured);
        };

        let record = record.stamped(&self.clock);
        tracing::debug!(record = ?record, endpoint = %endpoint, mode = ?self.mode, "Submitting record");

        let result = match self.mode {
            DeliveryMode::Opaque => self.deliver_opaque(endpoint, &record).await,
            DeliveryMode::Confirmed => self.deliver_confirmed(endpoint, &record).await,
        };

        match result {
            Ok(encoding) => {
                tracing::info!(encoding, "Submission dispatched");
                self.outcome(true, &self.messages.thank_you)
            }
            Err(e) => {
                tracing::error!(error = %e, "Submission failed");
                self.outcome(false, &self.messages.failure)
            }
        }
    }

    /// Walk the encodings until one dispatches without a transport error.
    async fn deliver_opaque(&self, endpoint: &Url, record: &Record) -> Result<&'static str, SubmitError> {
        let mut last = None;

        for encoding in &self.encodings {
            let attempt = match encoding.encode(endpoint, record) {
                Ok(request) => self.transport.dispatch(request).await,
                Err(e) => Err(e),
            };
            metrics::record_submit_attempt(encoding.name(), attempt.is_ok());

            match attempt {
                Ok(_) => return Ok(encoding.name()),
                Err(e) => {
                    tracing::warn!(encoding = encoding.name(), error = %e, "Attempt failed, trying next encoding");
                    last = Some(e);
                }
            }
        }

        Err(SubmitError::Exhausted {
            attempts: self.encodings.len(),
            last: last.map(|e| e.to_string()).unwrap_or_else(|| "no encodings configured".to_string()),
        })
    }

    /// One JSON POST whose reply must report success.
    async fn deliver_confirmed(&self, endpoint: &Url, record: &Record) -> Result<&'static str, SubmitError> {
        let request = JsonBody.encode(endpoint, record)?;
        let dispatched = self.transport.dispatch(request).await;
        metrics::record_submit_attempt(JsonBody.name(), dispatched.is_ok());
        let dispatched = dispatched?;

        let reply = serde_json::from_str::<IngestReply>(&dispatched.body);
        match reply {
            Ok(IngestReply::Success { row, .. }) if (200..300).contains(&dispatched.status) => {
                tracing::info!(row, "Endpoint confirmed append");
                Ok(JsonBody.name())
            }
            Ok(IngestReply::Error { error, .. }) => Err(SubmitError::Rejected {
                status: dispatched.status,
                detail: error,
            }),
            _ => Err(SubmitError::Rejected {
                status: dispatched.status,
                detail: "unrecognized reply".to_string(),
            }),
        }
    }

    fn outcome(&self, success: bool, message: &str) -> SubmitOutcome {
        SubmitOutcome {
            success,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::Method;
    use std::sync::Mutex;

    /// Records every dispatched request; the first `failures` calls fail.
    #[derive(Default)]
    struct SpyTransport {
        calls: Mutex<Vec<OutboundRequest>>,
        failures: usize,
        reply: Dispatched,
    }

    impl SpyTransport {
        fn failing(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures,
                ..Default::default()
            })
        }

        fn replying(status: u16, body: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                reply: Dispatched {
                    status,
                    body: body.to_string(),
                },
                ..Default::default()
            })
        }

        fn calls(&self) -> Vec<OutboundRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for SpyTransport {
        async fn dispatch(&self, request: OutboundRequest) -> Result<Dispatched, TransportError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request);
            if calls.len() <= self.failures {
                // Any serde error stands in for a network failure here.
                let err = serde_json::from_str::<serde_json::Value>("").unwrap_err();
                return Err(TransportError::Encode(err));
            }
            Ok(self.reply.clone())
        }
    }

    fn endpoint() -> Option<Url> {
        Some(Url::parse("http://intake.test/exec").unwrap())
    }

    fn record() -> Record {
        Record {
            name: "Sari".into(),
            phone: "0813".into(),
            email: "sari@example.com".into(),
            company: "Kedai Sari".into(),
            message: "Tertarik paket TikTok".into(),
            timestamp: String::new(),
        }
    }

    #[tokio::test]
    async fn test_unset_endpoint_makes_no_calls() {
        let spy = SpyTransport::failing(0);
        let chain = SubmissionChain::new(None, spy.clone());

        let outcome = chain.submit(&record()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, MessagesConfig::default().not_configured);
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_first_encoding_success_stops_chain() {
        let spy = SpyTransport::failing(0);
        let chain = SubmissionChain::new(endpoint(), spy.clone());

        let outcome = chain.submit(&record()).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, MessagesConfig::default().thank_you);

        let calls = spy.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::GET);
        let timestamp = calls[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "timestamp")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(!timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let spy = SpyTransport::failing(2);
        let chain = SubmissionChain::new(endpoint(), spy.clone());

        assert!(chain.submit(&record()).await.success);

        let calls = spy.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[1].body, OutboundBody::Multipart(_)));
        let OutboundBody::Json(json) = &calls[2].body else {
            panic!("third attempt should be JSON");
        };
        let sent = Record::from_json(json).unwrap();
        assert_eq!(sent.name, "Sari");
        assert!(!sent.timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_chain_reports_failure() {
        let spy = SpyTransport::failing(usize::MAX);
        let chain = SubmissionChain::new(endpoint(), spy.clone());

        let outcome = chain.submit(&record()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, MessagesConfig::default().failure);
        assert_eq!(spy.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_opaque_ignores_error_replies() {
        let spy = SpyTransport::replying(500, serde_json::json!({"result": "error"}));
        let chain = SubmissionChain::new(endpoint(), spy.clone());

        assert!(chain.submit(&record()).await.success);
        assert_eq!(spy.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_supplied_timestamp_is_kept() {
        let spy = SpyTransport::failing(0);
        let chain = SubmissionChain::new(endpoint(), spy.clone());
        let mut record = record();
        record.timestamp = "1/1/2026, 00.00.00".into();

        chain.submit(&record).await;
        let url = &spy.calls()[0].url;
        assert!(url.query_pairs().any(|(k, v)| k == "timestamp" && v == "1/1/2026, 00.00.00"));
    }

    #[tokio::test]
    async fn test_confirmed_mode_reads_reply() {
        let ok = SpyTransport::replying(
            200,
            serde_json::json!({"result": "success", "row": 4, "message": "saved"}),
        );
        let chain = SubmissionChain::new(endpoint(), ok.clone()).with_mode(DeliveryMode::Confirmed);
        assert!(chain.submit(&record()).await.success);
        assert_eq!(ok.calls().len(), 1);
        assert!(matches!(ok.calls()[0].body, OutboundBody::Json(_)));

        let rejected = SpyTransport::replying(
            400,
            serde_json::json!({"result": "error", "error": "Error: bad", "message": "failed"}),
        );
        let chain = SubmissionChain::new(endpoint(), rejected.clone()).with_mode(DeliveryMode::Confirmed);
        let outcome = chain.submit(&record()).await;
        assert!(!outcome.success);
        assert_eq!(rejected.calls().len(), 1);
    }

    #[test]
    fn test_invalid_endpoint_treated_as_unset() {
        let mut config = IntakeConfig::default();
        config.client.endpoint_url = Some("not a url".into());
        let chain = SubmissionChain::from_config(&config, SpyTransport::failing(0));
        assert!(chain.endpoint().is_none());
    }
}
