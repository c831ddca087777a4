//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Ingestion handler, HTTP layer and submission chain produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr (fmt subscriber, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are counters only; without an installed exporter they are no-ops
//! - Raw submission contents are never logged above debug

pub mod logging;
pub mod metrics;
