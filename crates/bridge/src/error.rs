//! Bridge Error Types

use alerta_client::ClientError;
use alerting::TranslateError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the command-line bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Config file missing or not a JSON object
    #[error("Failed to read config file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    /// Logging could not be initialized
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// Audit log or stdin I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// CA certificate for the Icinga2 API could not be read
    #[error("Failed to read CA certificate {path}: {source}")]
    CaCertificate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Icinga2 API transport failure
    #[error("Icinga2 API request failed: {0}")]
    Icinga(#[from] reqwest::Error),

    /// Icinga2 API answered with an error status
    #[error("Icinga2 API returned {status}: {body}")]
    IcingaStatus { status: u16, body: String },

    /// Acknowledgement request line was not valid JSON
    #[error("Invalid acknowledgement request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
}
