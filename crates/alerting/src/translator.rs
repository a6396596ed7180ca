//! Notification Translator
//!
//! Turns one Icinga2 notification into one Alerta alert. Pure: no I/O.

use crate::alert::{Alert, DEFAULT_TIMEOUT_SECONDS};
use crate::error::TranslateError;
use crate::notification::{Notification, ObjectKind, StateType};
use crate::severity::{Severity, SeverityMap};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Icinga2 API port appended to the external URL
pub const DEFAULT_EXTERNAL_PORT: u16 = 5665;

/// Event name used for host notifications, after Icinga2's default host check
pub const HOST_EVENT: &str = "hostalive";

pub const ATTR_MORE_INFO: &str = "moreInfo";
pub const ATTR_EXTERNAL_URL: &str = "externalUrl";
pub const ATTR_ALERT_TYPE: &str = "alertType";

const RESERVED_ATTRIBUTES: [&str; 3] = [ATTR_MORE_INFO, ATTR_EXTERNAL_URL, ATTR_ALERT_TYPE];

/// Translator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Environment used when the notification carries none
    pub environment: String,
    /// Severity for states missing from the table
    pub default_severity: Severity,
    /// Seconds before Alerta expires the alert
    pub timeout_seconds: u64,
    /// Port written into `externalUrl`
    pub external_port: u16,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            default_severity: Severity::Warning,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            external_port: DEFAULT_EXTERNAL_PORT,
        }
    }
}

/// Maps notifications to alerts
#[derive(Debug, Clone)]
pub struct Translator {
    config: TranslatorConfig,
    severities: SeverityMap,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        let severities = SeverityMap::new(config.default_severity);
        Self { config, severities }
    }

    /// Build the alert for a notification
    pub fn translate(&self, notification: &Notification) -> Result<Alert, TranslateError> {
        let kind = notification.kind();
        let event = match kind {
            ObjectKind::Service => notification.service_name.clone().unwrap_or_default(),
            ObjectKind::Host => HOST_EVENT.to_string(),
        };

        let mut alert = Alert::new(notification.address.clone(), event);
        alert.id = Some(alert_id(notification.display_name(), &alert.event));
        alert.environment = notification
            .environment
            .clone()
            .filter(|env| !env.is_empty())
            .unwrap_or_else(|| self.config.environment.clone());
        alert.severity = self.severities.resolve(notification.state());
        alert.value = format_value(
            notification.attempts,
            notification.max_attempts,
            notification.state_type,
        );
        alert.text = match notification.output().filter(|output| !output.is_empty()) {
            Some(output) => format!("{} {}", notification.notification_type, output),
            None => notification.notification_type.to_string(),
        };
        alert.origin = notification.web_url.clone();
        alert.timeout = self.config.timeout_seconds;
        alert.create_time = DateTime::from_timestamp(notification.time, 0)
            .filter(|_| notification.time > 0);

        if let Some(groups) = notification.groups.as_deref() {
            alert.tags = parse_tags(groups);
        }
        if let Some(vars) = notification.vars.as_deref() {
            merge_vars(&mut alert.attributes, vars);
        }

        let service = match kind {
            ObjectKind::Service => Some(alert.event.as_str()),
            ObjectKind::Host => None,
        };
        let more_info = more_info_link(&notification.web_url, &notification.hostname, service);
        alert.attributes.insert(ATTR_MORE_INFO.to_string(), more_info);
        alert.attributes.insert(
            ATTR_EXTERNAL_URL.to_string(),
            external_url(&notification.web_url, self.config.external_port),
        );
        alert
            .attributes
            .insert(ATTR_ALERT_TYPE.to_string(), kind.as_str().to_string());

        alert.attach_raw_data()?;

        debug!(
            "Translated {} notification for {}/{} to severity {}",
            notification.notification_type, alert.resource, alert.event, alert.severity
        );
        Ok(alert)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default())
    }
}

/// Stable alert id for a host/event pair
pub fn alert_id(display_name: &str, event: &str) -> String {
    let name = format!("{}.{}", display_name, event);
    Uuid::new_v3(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string()
}

/// `"{attempts}/{max_attempts} ({state_type})"`
pub fn format_value(attempts: u32, max_attempts: u32, state_type: StateType) -> String {
    format!("{}/{} ({})", attempts, max_attempts, state_type)
}

/// HTML link to the object's detail view in Icinga Web 2
pub fn more_info_link(web_url: &str, hostname: &str, service: Option<&str>) -> String {
    let base = web_url.trim_end_matches('/');
    let host = urlencoding::encode(hostname);
    let target = match service {
        Some(service) => format!(
            "service/show?host={}&service={}",
            host,
            urlencoding::encode(service)
        ),
        None => format!("host/show?host={}", host),
    };
    format!(
        "<a href=\"{}/icingaweb2/dashboard#!/icingaweb2/monitoring/{}\">Icinga GUI</a>",
        base, target
    )
}

/// Rewrite the web URL to point at the Icinga2 API: https, fixed port,
/// path and query left alone.
pub fn external_url(web_url: &str, port: u16) -> String {
    let (scheme, rest) = web_url.split_once("://").unwrap_or(("http", web_url));
    let scheme = if scheme.eq_ignore_ascii_case("http") {
        "https"
    } else {
        scheme
    };

    let end = rest
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(end);

    format!("{}://{}:{}{}", scheme, strip_port(authority), port, tail)
}

fn strip_port(authority: &str) -> &str {
    match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    }
}

/// Tags from a JSON array of strings or a comma-separated list
fn parse_tags(groups: &str) -> Vec<String> {
    let items = match serde_json::from_str::<Vec<String>>(groups) {
        Ok(items) => items,
        Err(_) => groups.split(',').map(str::to_string).collect(),
    };
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Flatten a custom-vars blob into attributes
fn merge_vars(attributes: &mut BTreeMap<String, String>, vars: &str) {
    let object = match serde_json::from_str::<serde_json::Map<String, Value>>(vars) {
        Ok(object) => object,
        Err(_) => {
            if !vars.trim().is_empty() {
                attributes.insert("vars".to_string(), vars.to_string());
            }
            return;
        }
    };

    for (key, value) in object {
        if RESERVED_ATTRIBUTES.contains(&key.as_str()) {
            debug!("Ignoring custom var {} that shadows a reserved attribute", key);
            continue;
        }
        let text = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        attributes.insert(key, text);
    }
}
