//! Append-only audit log of Alerta requests and responses

use crate::client::ApiResponse;
use chrono::Utc;
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Human-readable request/response log, one line per entry
pub struct AuditLog<W: Write = File> {
    writer: W,
}

impl AuditLog<File> {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!("Opened audit log {}", path.display());
        Ok(Self::new(file))
    }
}

impl<W: Write> AuditLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one timestamped entry
    pub fn record(&mut self, label: &str, message: impl Display) -> io::Result<()> {
        writeln!(self.writer, "{} {} {}", Utc::now().to_rfc3339(), label, message)?;
        self.writer.flush()
    }

    /// Write the method, target and payload of an Alerta request.
    /// `target` is relative to the alert collection URL.
    pub fn record_request(
        &mut self,
        label: &str,
        method: &str,
        target: &str,
        body: impl Display,
    ) -> io::Result<()> {
        self.record(label, format_args!("Request {} {} {}", method, target, body))
    }

    /// Write the status and body of an Alerta response
    pub fn record_response(&mut self, label: &str, response: &ApiResponse) -> io::Result<()> {
        self.record(
            label,
            format_args!("Response {} {}", response.status, response.body),
        )
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_lines() {
        let mut log = AuditLog::new(Vec::new());
        log.record("GOT", "web01 httpIp PROBLEM").unwrap();
        log.record_request("Create", "POST", "/", r#"{"resource":"web01"}"#)
            .unwrap();
        log.record_response(
            "Create",
            &ApiResponse {
                status: 201,
                body: r#"{"id":"abc"}"#.to_string(),
            },
        )
        .unwrap();

        let text = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("GOT web01 httpIp PROBLEM"));
        assert!(lines[1].ends_with(r#"Create Request POST / {"resource":"web01"}"#));
        assert!(lines[2].ends_with(r#"Create Response 201 {"id":"abc"}"#));
    }
}
