//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → environment overrides (LEAD_INTAKE_*)
//!     → validation.rs (semantic checks)
//!     → IntakeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_with_env, ConfigError};
pub use schema::{
    ClientConfig, DeliveryMode, IntakeConfig, ListenerConfig, MessagesConfig, RecordConfig,
    StoreBackend, StoreConfig,
};
