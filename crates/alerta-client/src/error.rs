//! Alerta Client Error Types

use thiserror::Error;

/// Errors raised while talking to Alerta
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API key cannot be used as a header value
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// Create call answered without an alert id
    #[error("Create response carried no alert id (status {status}): {body}")]
    MissingId { status: u16, body: String },

    /// Alert has no id to act on
    #[error("Alert {resource}/{event} has no id")]
    NoAlertId { resource: String, event: String },
}
