//! Bridge configuration
//!
//! Resolved in priority order: JSON config file, then `ALERTA_*` environment
//! variables, then built-in defaults.

use crate::error::BridgeError;
use alerta_client::AlertaConfig;
use alerting::{Severity, TranslatorConfig, DEFAULT_EXTERNAL_PORT, DEFAULT_TIMEOUT_SECONDS};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/icinga2/icinga2alerta.json";

/// Settings shared by all subcommands
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Alerta alert collection URL
    #[serde(rename = "alerta_api_host")]
    pub api_host: String,
    /// Alerta API key; empty sends no Authorization header
    #[serde(rename = "alerta_api_key")]
    pub api_key: String,
    /// Environment for alerts that do not name one
    #[serde(rename = "alerta_environment")]
    pub environment: String,
    /// Severity for unmapped Icinga2 states
    #[serde(rename = "alerta_default_severity")]
    pub default_severity: Severity,
    /// Seconds before Alerta expires an alert
    #[serde(rename = "alerta_alert_timeout")]
    pub alert_timeout: u64,
    /// Icinga2 API port used in `externalUrl`
    #[serde(rename = "alerta_external_port")]
    pub external_port: u16,
    /// Append-only request/response log
    #[serde(rename = "alerta_log_file")]
    pub log_file: PathBuf,
}

impl Settings {
    /// Load settings, failing if the config file is missing or malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        Self::from_sources(path.as_ref(), None)
    }

    fn from_sources(
        path: &Path,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, BridgeError> {
        let file = read_config_file(path)?;
        let settings: Settings = Config::builder()
            .set_default("alerta_api_host", "http://localhost:8080/api/alert")?
            .set_default("alerta_api_key", "")?
            .set_default("alerta_environment", "dev")?
            .set_default("alerta_default_severity", "warning")?
            .set_default("alerta_alert_timeout", DEFAULT_TIMEOUT_SECONDS as i64)?
            .set_default("alerta_external_port", i64::from(DEFAULT_EXTERNAL_PORT))?
            .set_default("alerta_log_file", "/tmp/alerta.log")?
            .add_source(
                Environment::with_prefix("ALERTA")
                    .keep_prefix(true)
                    .source(env),
            )
            .add_source(File::from_str(&file, FileFormat::Json))
            .build()?
            .try_deserialize()?;

        info!("Loaded config from {}", path.display());
        Ok(settings)
    }

    /// Translator settings derived from this config
    pub fn translator_config(&self) -> TranslatorConfig {
        TranslatorConfig {
            environment: self.environment.clone(),
            default_severity: self.default_severity,
            timeout_seconds: self.alert_timeout,
            external_port: self.external_port,
        }
    }

    /// Alerta endpoint and key derived from this config
    pub fn alerta_config(&self) -> AlertaConfig {
        AlertaConfig {
            base_url: self.api_host.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

/// Read the JSON config file with its keys lowercased to match
/// environment-derived keys
fn read_config_file(path: &Path) -> Result<String, BridgeError> {
    let invalid = |reason: String| BridgeError::ConfigFile {
        path: path.to_path_buf(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let object: Map<String, Value> =
        serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
    let normalized: Map<String, Value> = object
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();
    Ok(Value::Object(normalized).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let file = config_file("{}");
        let settings = Settings::from_sources(file.path(), env(&[])).unwrap();

        assert_eq!(settings.api_host, "http://localhost:8080/api/alert");
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.environment, "dev");
        assert_eq!(settings.default_severity, Severity::Warning);
        assert_eq!(settings.alert_timeout, 3600);
        assert_eq!(settings.external_port, 5665);
        assert_eq!(settings.log_file, PathBuf::from("/tmp/alerta.log"));
    }

    #[test]
    fn test_file_overrides_environment() {
        let file = config_file(
            r#"{"ALERTA_API_HOST": "https://alerta.example.com/api/alert", "ALERTA_DEFAULT_SEVERITY": "minor"}"#,
        );
        let settings = Settings::from_sources(
            file.path(),
            env(&[
                ("ALERTA_API_HOST", "http://from-env/api/alert"),
                ("ALERTA_API_KEY", "env-key"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.api_host, "https://alerta.example.com/api/alert");
        assert_eq!(settings.api_key, "env-key");
        assert_eq!(settings.default_severity, Severity::Minor);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let file = config_file("{}");
        let settings = Settings::from_sources(
            file.path(),
            env(&[("ALERTA_ENVIRONMENT", "Production"), ("ALERTA_EXTERNAL_PORT", "5561")]),
        )
        .unwrap();

        assert_eq!(settings.environment, "Production");
        assert_eq!(settings.external_port, 5561);
        assert_eq!(settings.translator_config().external_port, 5561);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::from_sources(&dir.path().join("absent.json"), env(&[]));
        assert!(matches!(result, Err(BridgeError::ConfigFile { .. })));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let file = config_file("{ not json");
        let result = Settings::from_sources(file.path(), env(&[]));
        assert!(matches!(result, Err(BridgeError::ConfigFile { .. })));
    }
}
