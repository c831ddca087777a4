//! Dispatching outbound requests.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::Client;
use thiserror::Error;

use crate::submit::encoding::{OutboundBody, OutboundRequest};

/// A request could not be put on the wire.
///
/// This is the only failure the opaque chain can observe.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What came back. Opaque delivery ignores it entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatched {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, request: OutboundRequest) -> Result<Dispatched, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn dispatch(&self, request: OutboundRequest) -> Result<Dispatched, TransportError> {
        let builder = self.client.request(request.method, request.url);
        let builder = match request.body {
            OutboundBody::Empty => builder,
            OutboundBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value));
                builder.multipart(form)
            }
            OutboundBody::Json(json) => builder.header(CONTENT_TYPE, "application/json").body(json),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        // Headers arrived, so the request was dispatched; an unreadable body
        // does not change that.
        let body = response.text().await.unwrap_or_default();

        Ok(Dispatched { status, body })
    }
}
