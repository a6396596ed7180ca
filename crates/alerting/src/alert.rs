//! Alerta Alert Record

use crate::error::TranslateError;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of the Alerta `type` field for alerts raised by this bridge
pub const ALERT_TYPE: &str = "icinga2Alert";

/// Default seconds before Alerta expires an alert
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3600;

/// Alert as accepted by the Alerta `POST /alert` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub resource: String,
    pub event: String,
    pub environment: String,
    pub severity: Severity,
    pub correlate: Vec<String>,
    pub service: Vec<String>,
    pub group: String,
    pub value: String,
    pub text: String,
    pub tags: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub origin: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Alert {
    /// Create an alert with Alerta's required fields set
    pub fn new(resource: impl Into<String>, event: impl Into<String>) -> Self {
        let resource = resource.into();
        let event = event.into();
        Self {
            id: None,
            group: resource.clone(),
            correlate: vec![event.clone()],
            service: vec![event.clone()],
            resource,
            event,
            environment: String::new(),
            severity: Severity::default(),
            value: String::new(),
            text: String::new(),
            tags: Vec::new(),
            attributes: BTreeMap::new(),
            origin: String::new(),
            alert_type: ALERT_TYPE.to_string(),
            create_time: None,
            timeout: DEFAULT_TIMEOUT_SECONDS,
            raw_data: None,
            note: None,
        }
    }

    /// Serialize to the JSON body sent to Alerta
    pub fn to_json(&self) -> Result<String, TranslateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Attach the serialized alert as its own `rawData`
    pub fn attach_raw_data(&mut self) -> Result<(), TranslateError> {
        self.raw_data = None;
        self.raw_data = Some(self.to_json()?);
        Ok(())
    }
}
