//! Acknowledgement daemon
//!
//! Reads acknowledgement requests (one JSON object per line) and forwards each
//! to the Icinga2 API. A failing request is logged and skipped.

use crate::error::BridgeError;
use reqwest::header::ACCEPT;
use reqwest::{Certificate, Client};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

/// Comment attached to acknowledgements made through the daemon
pub const ACK_COMMENT: &str = "ACK via icinga2alerta";

/// Icinga2 API endpoint and credentials
#[derive(Debug, Clone)]
pub struct IcingaApiConfig {
    /// Base URL, e.g. `https://icinga:5665`
    pub url: String,
    pub user: String,
    pub password: String,
    /// PEM CA certificate for a self-signed Icinga2 API
    pub ca_certificate: Option<PathBuf>,
}

/// Request to acknowledge a host or service problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckRequest {
    pub hostname: String,
    #[serde(default)]
    pub servicename: Option<String>,
    pub author: String,
}

impl AckRequest {
    fn object_type(&self) -> &'static str {
        match self.servicename {
            Some(_) => "Service",
            None => "Host",
        }
    }

    /// Icinga2 filter expression selecting the object
    pub fn filter(&self) -> String {
        let host = format!("host.name == \"{}\"", escape(&self.hostname));
        match self.servicename {
            Some(ref service) => format!("{} && service.name == \"{}\"", host, escape(service)),
            None => host,
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Serialize)]
struct AcknowledgeProblem<'a> {
    #[serde(rename = "type")]
    object_type: &'a str,
    filter: String,
    author: &'a str,
    comment: &'a str,
    sticky: bool,
    notify: bool,
}

/// Client for the Icinga2 `acknowledge-problem` action
pub struct IcingaClient {
    http: Client,
    base_url: String,
    user: String,
    password: String,
}

impl IcingaClient {
    pub fn new(config: IcingaApiConfig) -> Result<Self, BridgeError> {
        let mut builder = Client::builder();
        if let Some(path) = config.ca_certificate {
            let pem = std::fs::read(&path)
                .map_err(|source| BridgeError::CaCertificate { path, source })?;
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
            user: config.user,
            password: config.password,
        })
    }

    /// Acknowledge the host or service named in `request`
    pub async fn acknowledge(&self, request: &AckRequest) -> Result<(), BridgeError> {
        let body = AcknowledgeProblem {
            object_type: request.object_type(),
            filter: request.filter(),
            author: &request.author,
            comment: ACK_COMMENT,
            sticky: false,
            notify: true,
        };
        debug!("Acknowledging {} with filter {}", body.object_type, body.filter);

        let response = self
            .http
            .post(format!("{}/v1/actions/acknowledge-problem", self.base_url))
            .basic_auth(&self.user, Some(&self.password))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BridgeError::IcingaStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        info!("Acknowledged {} on behalf of {}", request.filter(), request.author);
        Ok(())
    }
}

async fn acknowledge_line(client: &IcingaClient, line: &str) -> Result<(), BridgeError> {
    let request: AckRequest = serde_json::from_str(line)?;
    client.acknowledge(&request).await
}

/// Handle one request line. Failures are logged and suppressed.
pub async fn handle_acknowledge(client: &IcingaClient, line: &str) -> bool {
    match acknowledge_line(client, line).await {
        Ok(()) => true,
        Err(e) => {
            error!("Unable to acknowledge the alert: {}", e);
            false
        }
    }
}

/// Process request lines until end of input; returns how many succeeded
pub async fn serve<R>(client: &IcingaClient, reader: R) -> Result<usize, BridgeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut acknowledged = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if handle_acknowledge(client, line).await {
            acknowledged += 1;
        }
    }

    Ok(acknowledged)
}

/// Run the daemon against stdin
pub async fn run_daemon(token: &str, config: IcingaApiConfig) -> Result<(), BridgeError> {
    info!(
        "Starting acknowledgement daemon for {} (bot token {})",
        config.url,
        if token.is_empty() { "missing" } else { "present" }
    );
    let client = IcingaClient::new(config)?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let acknowledged = serve(&client, stdin).await?;
    info!("Input closed after {} acknowledgements", acknowledged);
    Ok(())
}
