//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::IntakeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "LEAD_INTAKE_BIND";
/// Environment variable overriding `store.path`.
pub const ENV_STORE_PATH: &str = "LEAD_INTAKE_STORE_PATH";
/// Environment variable overriding `client.endpoint_url`.
pub const ENV_ENDPOINT_URL: &str = "LEAD_INTAKE_ENDPOINT_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<IntakeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: IntakeConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the file if one is given, fall back to defaults otherwise, then apply
/// environment overrides and validate the result.
pub fn load_with_env(path: Option<&Path>) -> Result<IntakeConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => {
            tracing::info!("No config file given, using defaults");
            IntakeConfig::default()
        }
    };

    let config = apply_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay values found through `lookup` onto `config`.
///
/// Blank values are ignored so an exported-but-empty variable does not wipe a
/// configured value.
pub fn apply_overrides<F>(mut config: IntakeConfig, lookup: F) -> IntakeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(bind) = lookup(ENV_BIND_ADDRESS) {
        tracing::info!(key = ENV_BIND_ADDRESS, value = %bind, "Overriding bind address");
        config.listener.bind_address = bind;
    }
    if let Some(path) = lookup(ENV_STORE_PATH) {
        tracing::info!(key = ENV_STORE_PATH, value = %path, "Overriding store path");
        config.store.path = path;
    }
    if let Some(endpoint) = lookup(ENV_ENDPOINT_URL) {
        tracing::info!(key = ENV_ENDPOINT_URL, "Overriding endpoint URL");
        config.client.endpoint_url = Some(endpoint);
    }

    config
}
