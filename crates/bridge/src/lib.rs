//! Icinga2 to Alerta bridge
//!
//! Entry points for the `icinga2alerta` notification command and the
//! acknowledgement daemon.

pub mod cli;
pub mod config;
pub mod daemon;
mod error;

use alerta_client::{dispatch, AlertaClient, AuditLog, LifecycleIntent};
use alerting::Translator;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub use crate::cli::{Cli, Command, DaemonArgs, NotificationArgs};
pub use crate::config::{Settings, DEFAULT_CONFIG_PATH};
pub use crate::error::BridgeError;

/// Initialize logging to stderr. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> Result<(), BridgeError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| BridgeError::Logging(e.to_string()))
}

/// Load configuration and run the selected subcommand
pub async fn run(cli: Cli) -> Result<(), BridgeError> {
    let settings = Settings::load(&cli.config)?;

    match cli.command {
        Command::Notification(args) => notify(&settings, &args).await,
        Command::Daemon(args) => daemon::run_daemon(&args.token, args.api_config()).await,
    }
}

/// Forward one notification to Alerta.
///
/// Only startup problems (audit log, translation, client setup) are returned;
/// failed Alerta calls are logged and the run still succeeds.
pub async fn notify(settings: &Settings, args: &NotificationArgs) -> Result<(), BridgeError> {
    let mut audit = AuditLog::open(&settings.log_file)?;
    let notification = args.to_notification();

    let summary = format!(
        "{} {} host={} service={} state={} address={} attempts={}/{} author={} comment={}",
        notification.notification_type,
        notification.state_type,
        notification.hostname,
        notification.service_name.as_deref().unwrap_or("-"),
        notification.state().unwrap_or("-"),
        notification.address,
        notification.attempts,
        notification.max_attempts,
        notification.author.as_deref().unwrap_or("-"),
        notification.comment.as_deref().unwrap_or("-"),
    );
    info!("Received {}", summary);
    if let Err(e) = audit.record("GOT", &summary) {
        warn!("Failed to write audit log: {}", e);
    }

    let alert = Translator::new(settings.translator_config()).translate(&notification)?;

    let mut alerta = settings.alerta_config();
    if let Some(token) = args.token.as_deref().filter(|token| !token.is_empty()) {
        alerta.api_key = token.to_string();
    }
    let client = AlertaClient::new(alerta)?;

    let intent = LifecycleIntent::for_notification(
        notification.notification_type,
        &alert,
        notification.author.as_deref(),
        notification.comment.as_deref(),
    );

    match dispatch(&client, &alert, &intent, &mut audit).await {
        Ok(responses) => info!(
            "Forwarded {} for {}/{} in {} calls",
            notification.notification_type,
            alert.resource,
            alert.event,
            responses.len()
        ),
        Err(e) => {
            error!("Failed to forward notification: {}", e);
            if let Err(io) = audit.record("ERROR", &e) {
                warn!("Failed to write audit log: {}", io);
            }
        }
    }

    Ok(())
}
