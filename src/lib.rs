//! Lead intake: contact-form submissions landed in an append-only row store.
//!
//! The crate has two halves that meet over HTTP:
//! - [`ingest`] and [`http`]: the server that accepts a record in any of the
//!   supported encodings and appends it as a six-column row
//! - [`submit`]: the client that delivers a record to that server, falling
//!   back across encodings when responses cannot be read

pub mod config;
pub mod http;
pub mod ingest;
pub mod lifecycle;
pub mod observability;
pub mod record;
pub mod selftest;
pub mod store;
pub mod submit;

pub use config::IntakeConfig;
pub use http::HttpServer;
pub use ingest::Ingestor;
pub use lifecycle::Shutdown;
pub use record::{Record, Row};
pub use submit::{SubmissionChain, SubmitOutcome};
