//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the intake
//! server and the submission client. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration shared by the server and client binaries.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct IntakeConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Row store settings.
    pub store: StoreConfig,

    /// Record normalization settings.
    pub record: RecordConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Body limits and CORS.
    pub security: SecurityConfig,

    /// Submission client settings.
    pub client: ClientConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Which row store backs the ingestion handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Rows are kept in process memory and lost on restart.
    Memory,
    /// Rows are appended to a JSON-lines file.
    File,
}

/// Row store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Path of the JSON-lines file used by the file backend.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            path: "leads.jsonl".to_string(),
        }
    }
}

/// Record normalization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Offset from UTC, in minutes, used when generating timestamps.
    pub utc_offset_minutes: i32,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            // Asia/Jakarta, no DST
            utc_offset_minutes: 7 * 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Origins allowed to call the intake endpoint. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

/// How the submission client treats the endpoint's responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Responses are unreadable; walk the encoding fallback chain.
    #[default]
    Opaque,
    /// Send one JSON request and read the reply.
    Confirmed,
}

/// Submission client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Ingestion endpoint URL. Unset means submissions fail without a
    /// network attempt.
    pub endpoint_url: Option<String>,

    pub mode: DeliveryMode,

    /// User-facing strings.
    pub messages: MessagesConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            mode: DeliveryMode::Opaque,
            messages: MessagesConfig::default(),
        }
    }
}

/// Localized messages shown to whoever submitted the form.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub thank_you: String,
    pub failure: String,
    pub not_configured: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            thank_you: "Terima kasih! Pesan Anda telah terkirim. Tim kami akan segera menghubungi Anda."
                .to_string(),
            failure: "Maaf, terjadi kesalahan. Silakan coba lagi atau hubungi kami melalui WhatsApp."
                .to_string(),
            not_configured: "Konfigurasi endpoint belum diatur. Silakan hubungi administrator."
                .to_string(),
        }
    }
}
