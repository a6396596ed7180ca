//! Command-line interface

use crate::config::DEFAULT_CONFIG_PATH;
use crate::daemon::IcingaApiConfig;
use alerting::{Notification, NotificationType, StateType};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "icinga2alerta", version)]
#[command(about = "Send your Icinga2 alerts to Alerta")]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true, env = "ICINGA2ALERTA_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forward one Icinga2 notification to Alerta
    Notification(NotificationArgs),

    /// Listen for acknowledgement requests and pass them to the Icinga2 API
    Daemon(DaemonArgs),
}

/// Notification fields, named after the Icinga2 runtime macros
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Alerta API key, overriding the configured one
    #[arg(long)]
    pub token: Option<String>,

    /// Time of the event as a UNIX timestamp
    #[arg(long)]
    pub time: i64,

    #[arg(long)]
    pub hostname: String,

    #[arg(long)]
    pub hostdisplayname: Option<String>,

    #[arg(long)]
    pub hostoutput: Option<String>,

    #[arg(long, value_parser = ["UP", "DOWN"])]
    pub hoststate: String,

    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub address6: Option<String>,

    #[arg(long)]
    pub servicename: Option<String>,

    #[arg(long)]
    pub servicedisplayname: Option<String>,

    #[arg(long)]
    pub serviceoutput: Option<String>,

    #[arg(long, value_parser = ["OK", "WARNING", "CRITICAL", "UNKNOWN"])]
    pub servicestate: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub attempts: u32,

    #[arg(long, default_value_t = 1)]
    pub max_attempts: u32,

    /// SOFT or HARD
    #[arg(long, default_value = "HARD")]
    pub state_type: StateType,

    /// ACKNOWLEDGEMENT, CUSTOM, DOWNTIMEEND, DOWNTIMEREMOVED, DOWNTIMESTART,
    /// FLAPPINGEND, FLAPPINGSTART, PROBLEM or RECOVERY
    #[arg(long)]
    pub notification_type: NotificationType,

    #[arg(long)]
    pub notification_author: Option<String>,

    #[arg(long)]
    pub notification_comment: Option<String>,

    /// Base URL of Icinga Web 2
    #[arg(long)]
    pub icingaweb2url: String,

    /// Enable the acknowledgement button for alerts
    #[arg(long, overrides_with = "no_ack")]
    pub ack: bool,

    /// Disable the acknowledgement button (default)
    #[arg(long, overrides_with = "ack")]
    pub no_ack: bool,

    /// Custom variables (JSON object)
    #[arg(long)]
    pub vars: Option<String>,

    /// Host or service groups (JSON array or comma-separated)
    #[arg(long)]
    pub groups: Option<String>,

    /// Alerta environment, overriding the configured default
    #[arg(long)]
    pub environment: Option<String>,
}

impl NotificationArgs {
    pub fn to_notification(&self) -> Notification {
        Notification {
            time: self.time,
            hostname: self.hostname.clone(),
            host_display_name: self.hostdisplayname.clone(),
            host_output: self.hostoutput.clone(),
            host_state: self.hoststate.clone(),
            address: self.address.clone(),
            address6: self.address6.clone(),
            service_name: self.servicename.clone(),
            service_display_name: self.servicedisplayname.clone(),
            service_output: self.serviceoutput.clone(),
            service_state: self.servicestate.clone(),
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            state_type: self.state_type,
            notification_type: self.notification_type,
            author: self.notification_author.clone(),
            comment: self.notification_comment.clone(),
            web_url: self.icingaweb2url.clone(),
            ack_enabled: self.ack && !self.no_ack,
            vars: self.vars.clone(),
            groups: self.groups.clone(),
            environment: self.environment.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct DaemonArgs {
    /// API token of the chat bot front end
    #[arg(long)]
    pub token: String,

    /// CA certificate of your Icinga2 API
    #[arg(long)]
    pub icinga2_cacert: Option<PathBuf>,

    /// Icinga2 API URL
    #[arg(long)]
    pub icinga2_api_url: String,

    /// Icinga2 API user
    #[arg(long)]
    pub icinga2_api_user: String,

    /// Icinga2 API password
    #[arg(long, env = "ICINGA2_API_PASSWORD", hide_env_values = true)]
    pub icinga2_api_password: String,
}

impl DaemonArgs {
    pub fn api_config(&self) -> IcingaApiConfig {
        IcingaApiConfig {
            url: self.icinga2_api_url.clone(),
            user: self.icinga2_api_user.clone(),
            password: self.icinga2_api_password.clone(),
            ca_certificate: self.icinga2_cacert.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("icinga2alerta").chain(args.iter().copied()))
    }

    const NOTIFICATION: &[&str] = &[
        "notification",
        "--time",
        "1700000000",
        "--hostname",
        "web01.example.com",
        "--hoststate",
        "UP",
        "--address",
        "web01",
        "--servicename",
        "httpIp",
        "--servicestate",
        "CRITICAL",
        "--attempts",
        "2",
        "--max-attempts",
        "3",
        "--state-type",
        "HARD",
        "--notification-type",
        "PROBLEM",
        "--icingaweb2url",
        "http://icinga",
    ];

    #[test]
    fn test_notification_args() {
        let cli = parse(NOTIFICATION).unwrap();
        let Command::Notification(args) = cli.command else {
            panic!("expected notification subcommand");
        };
        let notification = args.to_notification();

        assert_eq!(notification.hostname, "web01.example.com");
        assert_eq!(notification.service_name.as_deref(), Some("httpIp"));
        assert_eq!(notification.attempts, 2);
        assert_eq!(notification.max_attempts, 3);
        assert_eq!(notification.state_type, StateType::Hard);
        assert_eq!(notification.notification_type, NotificationType::Problem);
        assert!(!notification.ack_enabled);
    }

    #[test]
    fn test_ack_flags() {
        let mut args = NOTIFICATION.to_vec();
        args.push("--ack");
        let Command::Notification(parsed) = parse(&args).unwrap().command else {
            panic!("expected notification subcommand");
        };
        assert!(parsed.to_notification().ack_enabled);

        args.push("--no-ack");
        let Command::Notification(parsed) = parse(&args).unwrap().command else {
            panic!("expected notification subcommand");
        };
        assert!(!parsed.to_notification().ack_enabled);
    }

    #[test]
    fn test_rejects_unknown_states() {
        let mut args = NOTIFICATION.to_vec();
        args.extend(["--hoststate", "SIDEWAYS"]);
        assert!(parse(&args).is_err());

        let mut args = NOTIFICATION.to_vec();
        args.extend(["--notification-type", "problem"]);
        assert!(parse(&args).is_err());
    }

    #[test]
    fn test_daemon_args() {
        let cli = parse(&[
            "--config",
            "/tmp/icinga2alerta.json",
            "daemon",
            "--token",
            "bot-token",
            "--icinga2-api-url",
            "https://icinga:5665",
            "--icinga2-api-user",
            "root",
            "--icinga2-api-password",
            "secret",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/tmp/icinga2alerta.json"));
        let Command::Daemon(args) = cli.command else {
            panic!("expected daemon subcommand");
        };
        let config = args.api_config();
        assert_eq!(config.url, "https://icinga:5665");
        assert!(config.ca_certificate.is_none());
    }
}
