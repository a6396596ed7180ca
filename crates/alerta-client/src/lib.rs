//! Alerta Lifecycle Client
//!
//! REST calls against the Alerta alert API and the per-notification
//! dispatch that sequences them.

mod audit;
mod client;
mod error;
mod lifecycle;

pub use audit::AuditLog;
pub use client::{AlertApi, AlertaClient, AlertaConfig, Action, ApiResponse, ACTION_TIMEOUT_SECONDS};
pub use error::ClientError;
pub use lifecycle::{dispatch, LifecycleIntent};
