//! Icinga2 Notification Model

use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why Icinga2 fired the notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    Acknowledgement,
    Custom,
    DowntimeEnd,
    DowntimeRemoved,
    DowntimeStart,
    FlappingEnd,
    FlappingStart,
    #[default]
    Problem,
    Recovery,
}

impl NotificationType {
    /// All notification types, in Icinga2's naming order
    pub const ALL: [NotificationType; 9] = [
        NotificationType::Acknowledgement,
        NotificationType::Custom,
        NotificationType::DowntimeEnd,
        NotificationType::DowntimeRemoved,
        NotificationType::DowntimeStart,
        NotificationType::FlappingEnd,
        NotificationType::FlappingStart,
        NotificationType::Problem,
        NotificationType::Recovery,
    ];

    /// Icinga2 macro spelling, e.g. `DOWNTIMESTART`
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Acknowledgement => "ACKNOWLEDGEMENT",
            NotificationType::Custom => "CUSTOM",
            NotificationType::DowntimeEnd => "DOWNTIMEEND",
            NotificationType::DowntimeRemoved => "DOWNTIMEREMOVED",
            NotificationType::DowntimeStart => "DOWNTIMESTART",
            NotificationType::FlappingEnd => "FLAPPINGEND",
            NotificationType::FlappingStart => "FLAPPINGSTART",
            NotificationType::Problem => "PROBLEM",
            NotificationType::Recovery => "RECOVERY",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TranslateError::UnknownNotificationType(s.to_string()))
    }
}

/// Icinga2 check state type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateType {
    /// Not yet confirmed by the retry checks
    Soft,
    #[default]
    Hard,
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateType::Soft => f.write_str("SOFT"),
            StateType::Hard => f.write_str("HARD"),
        }
    }
}

impl FromStr for StateType {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOFT" => Ok(StateType::Soft),
            "HARD" => Ok(StateType::Hard),
            other => Err(TranslateError::UnknownStateType(other.to_string())),
        }
    }
}

/// Kind of monitored object a notification concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Host,
    Service,
}

impl ObjectKind {
    /// Lowercase name used in `alertType` and Icinga Web paths
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Host => "host",
            ObjectKind::Service => "service",
        }
    }
}

/// One Icinga2 notification, as passed by the notification command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notification {
    /// Event time as a UNIX timestamp
    pub time: i64,
    /// Icinga2 host object name
    pub hostname: String,
    /// Defaults to `hostname` when absent
    pub host_display_name: Option<String>,
    /// Plugin output of the host check
    pub host_output: Option<String>,
    /// UP or DOWN
    pub host_state: String,
    /// Host address, used as the alert resource
    pub address: String,
    /// IPv6 address, informational only
    pub address6: Option<String>,
    /// Absent for host notifications
    pub service_name: Option<String>,
    /// Display name shown in Icinga Web
    pub service_display_name: Option<String>,
    /// Plugin output of the service check
    pub service_output: Option<String>,
    /// OK, WARNING, CRITICAL or UNKNOWN
    pub service_state: Option<String>,
    /// Current check attempt
    pub attempts: u32,
    /// Attempts before the state turns HARD
    pub max_attempts: u32,
    pub state_type: StateType,
    pub notification_type: NotificationType,
    /// Who acknowledged or sent the custom notification
    pub author: Option<String>,
    /// Acknowledgement or custom notification comment
    pub comment: Option<String>,
    /// Base URL of the Icinga Web 2 instance
    pub web_url: String,
    /// Whether an acknowledgement button was requested
    pub ack_enabled: bool,
    /// Custom variables blob (JSON object or free text)
    pub vars: Option<String>,
    /// Group membership blob (JSON array or comma-separated list)
    pub groups: Option<String>,
    /// Alerta environment override
    pub environment: Option<String>,
}

impl Notification {
    /// Host or service notification
    pub fn kind(&self) -> ObjectKind {
        match self.service_name {
            Some(ref name) if !name.is_empty() => ObjectKind::Service,
            _ => ObjectKind::Host,
        }
    }

    pub fn display_name(&self) -> &str {
        self.host_display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.hostname)
    }

    /// State string fed to the severity table
    pub fn state(&self) -> Option<&str> {
        match self.kind() {
            ObjectKind::Service => self.service_state.as_deref(),
            ObjectKind::Host => Some(self.host_state.as_str()),
        }
    }

    /// Plugin output for the notified object, else the comment
    pub fn output(&self) -> Option<&str> {
        let output = match self.kind() {
            ObjectKind::Service => self.service_output.as_deref(),
            ObjectKind::Host => self.host_output.as_deref(),
        };
        output
            .filter(|text| !text.is_empty())
            .or(self.comment.as_deref())
    }
}
