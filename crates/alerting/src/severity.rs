//! Severity Mapping
//!
//! Maps Icinga2 host and service states onto the Alerta severity vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Alerta severity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    #[default]
    Warning,
    Minor,
    Critical,
    Unknown,
}

impl Severity {
    /// Wire name used by Alerta
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warning => "warning",
            Severity::Minor => "minor",
            Severity::Critical => "critical",
            Severity::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icinga2 state strings as they appear in notifications. Case-sensitive.
const STATE_TABLE: &[(&str, Severity)] = &[
    ("Up", Severity::Ok),
    ("UP", Severity::Ok),
    ("OK", Severity::Ok),
    ("Down", Severity::Critical),
    ("DOWN", Severity::Critical),
    ("Critical", Severity::Critical),
    ("CRITICAL", Severity::Critical),
    ("Warning", Severity::Warning),
    ("WARNING", Severity::Warning),
    ("Unknown", Severity::Minor),
    ("UNKNOWN", Severity::Minor),
    ("UNREACHABLE", Severity::Minor),
];

/// State-to-severity table with a fallback for unmapped states
#[derive(Debug, Clone, Copy)]
pub struct SeverityMap {
    default: Severity,
}

impl SeverityMap {
    /// Create a map that resolves unmapped states to `default`
    pub fn new(default: Severity) -> Self {
        Self { default }
    }

    /// Look up a state in the fixed table
    pub fn lookup(state: &str) -> Option<Severity> {
        STATE_TABLE
            .iter()
            .find(|(name, _)| *name == state)
            .map(|(_, severity)| *severity)
    }

    /// Resolve a state, falling back to the configured default
    pub fn resolve(&self, state: Option<&str>) -> Severity {
        match state.and_then(Self::lookup) {
            Some(severity) => severity,
            None => {
                debug!(
                    "Unmapped state {:?}, using default severity {}",
                    state, self.default
                );
                self.default
            }
        }
    }
}

impl Default for SeverityMap {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}
