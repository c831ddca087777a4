//! Request identification and payload extraction.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every request
//! - Turn an HTTP request into an `InboundRequest`
//!
//! # Design Decisions
//! - Form bodies (urlencoded or multipart) become parameters, never a raw body
//! - Any other non-empty body is handed over verbatim as the raw body
//! - Query parameters are merged after body fields

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{header, HeaderValue, Request, StatusCode},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::ingest::{InboundRequest, IngestError, Parameters};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator producing UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID a previous layer attached, for logging.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

enum BodyKind {
    UrlEncoded,
    Multipart,
    Raw,
}

fn body_kind<B>(request: &Request<B>) -> BodyKind {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::UrlEncoded
    } else if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else {
        BodyKind::Raw
    }
}

/// Classify an extractor rejection; a tripped body limit is its own error.
fn body_error(status: StatusCode, text: String) -> IngestError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        IngestError::TooLarge
    } else {
        IngestError::Body(text)
    }
}

/// Consume an HTTP request and produce the handler's view of it.
///
/// The body is buffered under the router's `DefaultBodyLimit`.
pub async fn extract_inbound(request: Request<Body>) -> Result<InboundRequest, IngestError> {
    let query: Vec<(String, String)> = request
        .uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let mut inbound = InboundRequest::default();

    match body_kind(&request) {
        BodyKind::Multipart => {
            let mut multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            inbound.parameters = read_multipart(&mut multipart).await?;
        }
        BodyKind::UrlEncoded => {
            let bytes = Bytes::from_request(request, &())
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            inbound.parameters = url::form_urlencoded::parse(&bytes).into_owned().collect();
        }
        BodyKind::Raw => {
            let bytes = Bytes::from_request(request, &())
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            if !bytes.is_empty() {
                inbound.body = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    inbound.parameters.extend(query);
    Ok(inbound)
}

async fn read_multipart(multipart: &mut Multipart) -> Result<Parameters, IngestError> {
    let mut params = Parameters::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;
        params.push(name, value);
    }
    Ok(params)
}
