//! Lead intake server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser / lead-cli                          lead-intake
//!  ┌──────────────────┐                ┌───────────────────────────────────┐
//!  │ SubmissionChain  │  GET ?name=..  │  http::server (axum + tower-http) │
//!  │  1. query GET    │ ─────────────▶ │      │                            │
//!  │  2. multipart    │  POST data=..  │      ▼                            │
//!  │  3. JSON POST    │ ─────────────▶ │  ingest::Ingestor                 │
//!  └──────────────────┘  POST {json}   │   raw JSON → packed → discrete    │
//!                                      │      │                            │
//!                                      │      ▼                            │
//!                                      │  store::RowStore (append-only)    │
//!                                      └───────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use lead_intake::config::{load_with_env, IntakeConfig};
use lead_intake::http::HttpServer;
use lead_intake::ingest::Ingestor;
use lead_intake::lifecycle::Shutdown;
use lead_intake::observability::{logging, metrics};
use lead_intake::record::Timestamper;
use lead_intake::selftest::run_self_test;
use lead_intake::store::open_store;

#[derive(Parser)]
#[command(name = "lead-intake")]
#[command(about = "Contact lead ingestion server", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the ingestion endpoint (default)
    Serve,
    /// Append sample rows through every entry point and report
    SelfTest,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_with_env(cli.config.as_deref())?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        store = ?config.store.backend,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::SelfTest => self_test(config).await,
    }
}

async fn build_ingestor(config: &IntakeConfig) -> Result<(Arc<Ingestor>, Timestamper), Box<dyn std::error::Error>> {
    let store = open_store(&config.store).await?;
    tracing::info!(rows = store.len().await?, "Row store ready");
    let clock = Timestamper::from_config(&config.record);
    Ok((Arc::new(Ingestor::new(store, clock)), clock))
}

async fn serve(config: IntakeConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (ingestor, _) = build_ingestor(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, ingestor);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn self_test(config: IntakeConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (ingestor, clock) = build_ingestor(&config).await?;
    let report = run_self_test(&ingestor, &clock).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
