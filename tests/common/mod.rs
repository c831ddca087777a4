//! Shared helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tokio::net::TcpListener;

use lead_intake::config::IntakeConfig;
use lead_intake::http::HttpServer;
use lead_intake::ingest::Ingestor;
use lead_intake::lifecycle::Shutdown;
use lead_intake::record::Timestamper;
use lead_intake::store::MemoryStore;

/// A running intake server backed by a memory store.
pub struct Intake {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    shutdown: Shutdown,
}

impl Intake {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Intake {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start an intake server on an ephemeral local port.
pub async fn start_intake() -> Intake {
    start_intake_with(IntakeConfig::default()).await
}

pub async fn start_intake_with(config: IntakeConfig) -> Intake {
    let store = Arc::new(MemoryStore::new());
    let ingestor = Arc::new(Ingestor::new(store.clone(), Timestamper::default()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, ingestor);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    Intake {
        addr,
        store,
        shutdown,
    }
}

/// Start a backend that answers every request with a fixed status and body.
#[allow(dead_code)]
pub async fn start_fixed_backend(status: u16, body: &'static str) -> SocketAddr {
    let status = StatusCode::from_u16(status).unwrap();
    let app = Router::new().fallback(move || async move { (status, body) });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// HTTP client that never routes local test traffic through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
