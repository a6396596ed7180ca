//! Translation Error Types

use thiserror::Error;

/// Errors raised while building or parsing notification data
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Alert could not be serialized into its raw form
    #[error("Failed to serialize alert: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Notification type string not recognized
    #[error("Unknown notification type: {0}")]
    UnknownNotificationType(String),

    /// State type string not recognized
    #[error("Unknown state type: {0} (expected SOFT or HARD)")]
    UnknownStateType(String),
}
