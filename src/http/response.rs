//! Mapping ingestion outcomes onto HTTP responses.
//!
//! - Liveness and diagnostics: 200, `text/plain`
//! - Saved: 200, JSON success reply
//! - Failed: JSON error reply, 400 for unusable payloads, 408/413 for timeouts
//!   and oversized bodies, 500 for store faults
//! - Bare 408/413 responses from the tower-http layers are rewritten into the
//!   same JSON error reply by [`error_shape`]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::ingest::{Channel, IngestError, IngestOutcome};

fn failure_status(error: &IngestError) -> StatusCode {
    match error {
        IngestError::DataAbsent | IngestError::Body(_) | IngestError::Parse(_) => {
            StatusCode::BAD_REQUEST
        }
        IngestError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        IngestError::TimedOut => StatusCode::REQUEST_TIMEOUT,
        IngestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Middleware giving timeout and body-limit rejections the JSON error shape.
pub async fn error_shape(request: Request<Body>, next: Next) -> Response {
    let channel = if request.method() == Method::GET {
        Channel::Get
    } else {
        Channel::Post
    };

    let response = next.run(request).await;
    if is_json(&response) {
        return response;
    }

    let error = match response.status() {
        StatusCode::REQUEST_TIMEOUT => IngestError::TimedOut,
        StatusCode::PAYLOAD_TOO_LARGE => IngestError::TooLarge,
        _ => return response,
    };

    tracing::warn!(channel = channel.as_str(), error = %error, "Request rejected by middleware");
    IngestOutcome::Failed { channel, error }.into_response()
}

impl IntoResponse for IngestOutcome {
    fn into_response(self) -> Response {
        let status = match &self {
            IngestOutcome::Failed { error, .. } => failure_status(error),
            _ => StatusCode::OK,
        };

        match (self.reply(), self) {
            (Some(reply), _) => (status, Json(reply)).into_response(),
            (None, IngestOutcome::Diagnostic(text) | IngestOutcome::Liveness(text)) => {
                (status, text).into_response()
            }
            (None, _) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_statuses() {
        let saved = IngestOutcome::Saved { channel: Channel::Post, row: 1 }.into_response();
        assert_eq!(saved.status(), StatusCode::OK);

        let absent = IngestOutcome::Failed {
            channel: Channel::Post,
            error: IngestError::DataAbsent,
        }
        .into_response();
        assert_eq!(absent.status(), StatusCode::BAD_REQUEST);

        let store = IngestOutcome::Failed {
            channel: Channel::Post,
            error: IngestError::Store(StoreError::Unavailable("down".into())),
        }
        .into_response();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_limit_statuses() {
        let large = IngestOutcome::Failed {
            channel: Channel::Post,
            error: IngestError::TooLarge,
        }
        .into_response();
        assert_eq!(large.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(is_json(&large));

        let slow = IngestOutcome::Failed {
            channel: Channel::Get,
            error: IngestError::TimedOut,
        }
        .into_response();
        assert_eq!(slow.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_error_shape_rewrites_bare_timeout() {
        use axum::{middleware, routing::post, Router};
        use tower::ServiceExt;

        let router = Router::new()
            .route("/", post(|| async { StatusCode::REQUEST_TIMEOUT }))
            .layer(middleware::from_fn(error_shape));

        let response = router
            .oneshot(Request::post("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert!(is_json(&response));
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(reply["result"], "error");
        assert_eq!(reply["error"], "Error: request timed out");
        assert_eq!(reply["message"], "Failed to save data via POST");
    }

    #[test]
    fn test_liveness_is_plain_text() {
        let response = IngestOutcome::Liveness("ok".into()).into_response();
        let content_type = response.headers()[axum::http::header::CONTENT_TYPE]
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/plain"));
    }
}
