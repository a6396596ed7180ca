//! Notification Translation
//!
//! Maps Icinga2 notifications onto Alerta alerts: severity mapping,
//! correlation and grouping keys, and links back to Icinga Web 2.

mod alert;
mod error;
mod notification;
mod severity;
mod translator;

pub use alert::{Alert, ALERT_TYPE, DEFAULT_TIMEOUT_SECONDS};
pub use error::TranslateError;
pub use notification::{Notification, NotificationType, ObjectKind, StateType};
pub use severity::{Severity, SeverityMap};
pub use translator::{
    alert_id, external_url, format_value, more_info_link, Translator, TranslatorConfig,
    ATTR_ALERT_TYPE, ATTR_EXTERNAL_URL, ATTR_MORE_INFO, DEFAULT_EXTERNAL_PORT, HOST_EVENT,
};
