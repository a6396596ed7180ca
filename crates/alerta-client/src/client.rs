//! Alerta REST Client
//!
//! One method per Alerta endpoint. Every call returns the raw status and body;
//! a non-2xx answer is a response, not an error.

use crate::error::ClientError;
use alerting::Alert;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// Seconds an action (ack, shelve, ...) stays in effect
pub const ACTION_TIMEOUT_SECONDS: u64 = 7200;

/// Alerta endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertaConfig {
    /// Alert collection URL, e.g. `http://alerta:8080/api/alert`
    pub base_url: String,
    /// API key sent as `Authorization: Key ...`; empty disables the header
    pub api_key: String,
}

impl Default for AlertaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/alert".to_string(),
            api_key: String::new(),
        }
    }
}

/// Alert state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Acknowledge for `ACTION_TIMEOUT_SECONDS`
    Ack,
    Unack,
    /// Reopen a closed or acknowledged alert
    Open,
    /// Hide the alert for `ACTION_TIMEOUT_SECONDS`
    Shelve,
    Unshelve,
    Close,
}

impl Action {
    /// Wire name in the `action` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ack => "ack",
            Action::Unack => "unack",
            Action::Open => "open",
            Action::Shelve => "shelve",
            Action::Unshelve => "unshelve",
            Action::Close => "close",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
struct ActionRequest<'a> {
    action: &'a str,
    text: String,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct NoteRequest<'a> {
    note: &'a str,
}

/// Status and body of one Alerta call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body, kept for the audit log
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-assigned alert id from a create response (`id` or `alert.id`)
    pub fn alert_id(&self) -> Option<String> {
        let body: Value = serde_json::from_str(&self.body).ok()?;
        body.get("id")
            .and_then(Value::as_str)
            .or_else(|| body.pointer("/alert/id").and_then(Value::as_str))
            .map(str::to_string)
    }

    /// Id from a create response, or an error carrying the raw answer
    pub fn require_alert_id(&self) -> Result<String, ClientError> {
        self.alert_id().ok_or_else(|| ClientError::MissingId {
            status: self.status,
            body: self.body.clone(),
        })
    }

    async fn read(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Self { status, body })
    }
}

/// Alerta alert endpoints
#[async_trait]
pub trait AlertApi: Send + Sync {
    /// `POST {base}`: create, or update a correlated alert
    async fn create(&self, alert: &Alert) -> Result<ApiResponse, ClientError>;

    /// `DELETE {base}/{id}`
    async fn delete(&self, id: &str) -> Result<ApiResponse, ClientError>;

    /// `PUT {base}/{id}/note`
    async fn annotate_id(&self, id: &str, note: &str) -> Result<ApiResponse, ClientError>;

    /// `PUT {base}/{id}/action`
    async fn set_action(&self, id: &str, action: Action) -> Result<ApiResponse, ClientError>;

    /// Create the alert, then attach a note to the id Alerta returns
    async fn annotate(&self, alert: &Alert, note: &str) -> Result<ApiResponse, ClientError> {
        let created = self.create(alert).await?;
        let id = created.require_alert_id()?;
        self.annotate_id(&id, note).await
    }
}

/// HTTP client for one Alerta instance
pub struct AlertaClient {
    http: Client,
    base_url: String,
}

impl AlertaClient {
    /// Build a client; the API key is sent on every request
    pub fn new(config: AlertaConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let mut value = HeaderValue::from_str(&format!("Key {}", config.api_key))
                .map_err(|e| ClientError::InvalidApiKey(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder().default_headers(headers).build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!("Created Alerta client for {}", base_url);

        Ok(Self { http, base_url })
    }

    fn alert_url(&self, id: &str, suffix: Option<&str>) -> String {
        match suffix {
            Some(suffix) => format!("{}/{}/{}", self.base_url, id, suffix),
            None => format!("{}/{}", self.base_url, id),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, ClientError> {
        let response = ApiResponse::read(request.send().await?).await?;
        debug!("Alerta answered {}: {}", response.status, response.body);
        Ok(response)
    }
}

#[async_trait]
impl AlertApi for AlertaClient {
    async fn create(&self, alert: &Alert) -> Result<ApiResponse, ClientError> {
        debug!("Creating alert {}/{}", alert.resource, alert.event);
        self.send(self.http.post(&self.base_url).json(alert)).await
    }

    async fn delete(&self, id: &str) -> Result<ApiResponse, ClientError> {
        debug!("Deleting alert {}", id);
        self.send(self.http.delete(self.alert_url(id, None))).await
    }

    async fn annotate_id(&self, id: &str, note: &str) -> Result<ApiResponse, ClientError> {
        debug!("Adding note to alert {}", id);
        let body = NoteRequest { note };
        self.send(self.http.put(self.alert_url(id, Some("note"))).json(&body))
            .await
    }

    async fn set_action(&self, id: &str, action: Action) -> Result<ApiResponse, ClientError> {
        debug!("Applying {} to alert {}", action, id);
        let body = ActionRequest {
            action: action.as_str(),
            text: format!("{} from icinga2", action.as_str().to_uppercase()),
            timeout: ACTION_TIMEOUT_SECONDS,
        };
        self.send(self.http.put(self.alert_url(id, Some("action"))).json(&body))
            .await
    }
}
