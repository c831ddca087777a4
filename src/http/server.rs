//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the ingestion handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Keep every rejection in the JSON error shape
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::IntakeConfig;
use crate::http::request::{extract_inbound, request_id, MakeRequestUuid};
use crate::http::response::error_shape;
use crate::ingest::{Channel, IngestOutcome, Ingestor};
use crate::lifecycle::signals::wait_for_signal;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
}

/// HTTP server exposing the ingestion handler.
pub struct HttpServer {
    router: Router,
    config: IntakeConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: IntakeConfig, ingestor: Arc<Ingestor>) -> Self {
        let state = AppState { ingestor };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &IntakeConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(get_handler).post(post_handler))
            .route("/exec", get(get_handler).post(post_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(middleware::from_fn(error_shape))
            .layer(cors_layer(&config.security.allowed_origins))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// A clone of the fully layered router, for in-process callers.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C/SIGTERM or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = wait_for_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

async fn post_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, Channel::Post, request).await
}

async fn get_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, Channel::Get, request).await
}

async fn handle(state: AppState, channel: Channel, request: Request<Body>) -> Response {
    let id = request_id(&request);

    let inbound = match extract_inbound(request).await {
        Ok(inbound) => inbound,
        Err(error) => {
            tracing::warn!(request_id = %id, error = %error, "Unreadable request");
            return IngestOutcome::Failed { channel, error }.into_response();
        }
    };

    tracing::debug!(
        request_id = %id,
        channel = channel.as_str(),
        has_body = inbound.raw_body().is_some(),
        parameters = inbound.parameters.len(),
        "Ingesting request"
    );

    let outcome = match channel {
        Channel::Post => state.ingestor.handle_post(Some(&inbound)).await,
        Channel::Get => state.ingestor.handle_get(Some(&inbound)).await,
    };

    tracing::info!(request_id = %id, outcome = outcome.label(), "Request handled");
    outcome.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Timestamper;
    use crate::store::MemoryStore;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> (Arc<MemoryStore>, HttpServer) {
        let store = Arc::new(MemoryStore::new());
        let ingestor = Arc::new(Ingestor::new(store.clone(), Timestamper::default()));
        (store, HttpServer::new(IntakeConfig::default(), ingestor))
    }

    #[tokio::test]
    async fn test_post_json_in_process() {
        let (store, server) = server();
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"A","email":"b@c.d","message":"hi"}"#))
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(crate::http::X_REQUEST_ID));
        assert_eq!(store.rows().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (store, server) = server();
        let request = Request::get("/admin").body(Body::empty()).unwrap();

        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.rows().await.len(), 0);
    }

    #[tokio::test]
    async fn test_unsized_oversized_body_is_json_413() {
        let store = Arc::new(MemoryStore::new());
        let ingestor = Arc::new(Ingestor::new(store.clone(), Timestamper::default()));
        let mut config = IntakeConfig::default();
        config.security.max_body_size = 64;
        let server = HttpServer::new(config, ingestor);

        // No Content-Length header, so the limit trips while buffering.
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!("{{\"message\":\"{}\"}}", "x".repeat(256))))
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(reply["result"], "error");
        assert_eq!(store.rows().await.len(), 0);
    }

    #[test]
    fn test_cors_skips_invalid_origins() {
        // Builds without panicking even when an origin is not a header value.
        let _ = cors_layer(&["https://ok.example.com".to_string(), "bad\norigin".to_string()]);
    }
}
