//! Alert Lifecycle Dispatch
//!
//! Chooses the Alerta calls for a notification type and issues them in order.

use crate::audit::AuditLog;
use crate::client::{Action, AlertApi, ApiResponse};
use crate::error::ClientError;
use alerting::{Alert, NotificationType};
use std::io::Write;
use tracing::{info, warn};

/// What a notification does to its alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleIntent {
    /// Create, or update the correlated alert
    Create,
    /// Create, acknowledge, then note who acknowledged
    Acknowledge { note: String },
    /// Create, then attach a note
    Annotate { note: String },
    /// Close the alert by id
    Close,
}

impl LifecycleIntent {
    /// Intent for a notification type. `author` and `comment` feed the note text.
    pub fn for_notification(
        notification_type: NotificationType,
        alert: &Alert,
        author: Option<&str>,
        comment: Option<&str>,
    ) -> Self {
        let author = author.unwrap_or("unknown");
        let comment = comment.unwrap_or_default();
        match notification_type {
            NotificationType::Acknowledgement => LifecycleIntent::Acknowledge {
                note: format!(
                    "ACK: remote ack from {}: {}: {}",
                    alert.origin, author, comment
                ),
            },
            NotificationType::Custom => LifecycleIntent::Annotate {
                note: format!("{}: {}", author, comment),
            },
            NotificationType::Recovery => LifecycleIntent::Close,
            NotificationType::Problem
            | NotificationType::DowntimeEnd
            | NotificationType::DowntimeRemoved
            | NotificationType::DowntimeStart
            | NotificationType::FlappingEnd
            | NotificationType::FlappingStart => LifecycleIntent::Create,
        }
    }
}

/// Issue the calls for `intent` and return every response in call order.
///
/// Non-2xx responses are logged and returned; only transport failures or a
/// create response without an id stop the sequence.
pub async fn dispatch<A, W>(
    api: &A,
    alert: &Alert,
    intent: &LifecycleIntent,
    audit: &mut AuditLog<W>,
) -> Result<Vec<ApiResponse>, ClientError>
where
    A: AlertApi + ?Sized,
    W: Write,
{
    let mut responses = Vec::new();

    match intent {
        LifecycleIntent::Create => {
            note_request(audit, "Create", "POST", "/", alert_body(alert));
            let created = api.create(alert).await?;
            note_response(audit, "Create", &created);
            responses.push(created);
        }
        LifecycleIntent::Acknowledge { note } => {
            note_request(audit, "Create", "POST", "/", alert_body(alert));
            let created = api.create(alert).await?;
            note_response(audit, "Create", &created);
            let id = created.require_alert_id()?;
            responses.push(created);

            note_request(audit, "Ack", "PUT", &format!("{}/action", id), Action::Ack);
            let acked = api.set_action(&id, Action::Ack).await?;
            note_response(audit, "Ack", &acked);
            responses.push(acked);

            note_request(audit, "Note", "PUT", &format!("{}/note", id), note);
            let noted = api.annotate_id(&id, note).await?;
            note_response(audit, "Note", &noted);
            responses.push(noted);
        }
        LifecycleIntent::Annotate { note } => {
            note_request(audit, "Create", "POST", "/", alert_body(alert));
            let created = api.create(alert).await?;
            note_response(audit, "Create", &created);
            let id = created.require_alert_id()?;
            responses.push(created);

            note_request(audit, "Note", "PUT", &format!("{}/note", id), note);
            let noted = api.annotate_id(&id, note).await?;
            note_response(audit, "Note", &noted);
            responses.push(noted);
        }
        LifecycleIntent::Close => {
            let id = alert.id.as_deref().ok_or_else(|| ClientError::NoAlertId {
                resource: alert.resource.clone(),
                event: alert.event.clone(),
            })?;
            note_request(audit, "Close", "PUT", &format!("{}/action", id), Action::Close);
            let closed = api.set_action(id, Action::Close).await?;
            note_response(audit, "Close", &closed);
            responses.push(closed);
        }
    }

    info!(
        "Dispatched {:?} for {}/{} ({} calls)",
        intent,
        alert.resource,
        alert.event,
        responses.len()
    );
    Ok(responses)
}

fn alert_body(alert: &Alert) -> String {
    serde_json::to_string(alert).unwrap_or_else(|e| format!("<unserializable alert: {}>", e))
}

fn note_request<W: Write>(
    audit: &mut AuditLog<W>,
    label: &str,
    method: &str,
    target: &str,
    body: impl std::fmt::Display,
) {
    if let Err(e) = audit.record_request(label, method, target, body) {
        warn!("Failed to write audit log: {}", e);
    }
}

fn note_response<W: Write>(audit: &mut AuditLog<W>, label: &str, response: &ApiResponse) {
    if response.is_success() {
        info!("{} answered {}", label, response.status);
    } else {
        warn!("{} answered {}: {}", label, response.status, response.body);
    }
    if let Err(e) = audit.record_response(label, response) {
        warn!("Failed to write audit log: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::{Notification, StateType, Translator};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls instead of sending them
    struct Recorder {
        calls: Mutex<Vec<String>>,
        created: Mutex<Vec<Alert>>,
        create_body: String,
    }

    impl Recorder {
        fn new(server_id: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                created: Mutex::new(Vec::new()),
                create_body: format!(r#"{{"status":"ok","id":"{}"}}"#, server_id),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn push(&self, call: String) -> Result<ApiResponse, ClientError> {
            self.calls.lock().unwrap().push(call);
            Ok(ApiResponse {
                status: 200,
                body: r#"{"status":"ok"}"#.to_string(),
            })
        }
    }

    #[async_trait]
    impl AlertApi for Recorder {
        async fn create(&self, alert: &Alert) -> Result<ApiResponse, ClientError> {
            self.calls.lock().unwrap().push("create".to_string());
            self.created.lock().unwrap().push(alert.clone());
            Ok(ApiResponse {
                status: 201,
                body: self.create_body.clone(),
            })
        }

        async fn delete(&self, id: &str) -> Result<ApiResponse, ClientError> {
            self.push(format!("delete {}", id))
        }

        async fn annotate_id(&self, id: &str, note: &str) -> Result<ApiResponse, ClientError> {
            self.push(format!("note {} {}", id, note))
        }

        async fn set_action(&self, id: &str, action: Action) -> Result<ApiResponse, ClientError> {
            self.push(format!("action {} {}", id, action))
        }
    }

    fn alert_for(notification_type: NotificationType) -> Alert {
        let notification = Notification {
            hostname: "web01".to_string(),
            host_state: "UP".to_string(),
            address: "web01".to_string(),
            service_name: Some("httpIp".to_string()),
            service_state: Some("CRITICAL".to_string()),
            attempts: 2,
            max_attempts: 3,
            state_type: StateType::Hard,
            notification_type,
            web_url: "http://icinga".to_string(),
            ..Default::default()
        };
        Translator::default().translate(&notification).unwrap()
    }

    async fn run(notification_type: NotificationType) -> (Recorder, Vec<ApiResponse>, String) {
        let alert = alert_for(notification_type);
        let intent =
            LifecycleIntent::for_notification(notification_type, &alert, Some("alice"), Some("on it"));
        let api = Recorder::new("srv-1");
        let mut audit = AuditLog::new(Vec::new());
        let responses = dispatch(&api, &alert, &intent, &mut audit).await.unwrap();
        let log = String::from_utf8(audit.into_inner()).unwrap();
        (api, responses, log)
    }

    #[tokio::test]
    async fn test_acknowledgement_creates_acks_then_notes() {
        let (api, responses, log) = run(NotificationType::Acknowledgement).await;

        assert_eq!(
            api.calls(),
            vec![
                "create".to_string(),
                "action srv-1 ack".to_string(),
                "note srv-1 ACK: remote ack from http://icinga: alice: on it".to_string(),
            ]
        );
        assert_eq!(responses.len(), 3);

        let entries: Vec<&str> = log
            .lines()
            .map(|line| line.split_once(' ').unwrap().1)
            .collect();
        assert_eq!(entries.len(), 6);
        assert!(entries[0].starts_with("Create Request POST / {"));
        assert!(entries[0].contains(r#""resource":"web01""#));
        assert!(entries[1].starts_with("Create Response 201"));
        assert_eq!(entries[2], "Ack Request PUT srv-1/action ack");
        assert!(entries[3].starts_with("Ack Response 200"));
        assert_eq!(
            entries[4],
            "Note Request PUT srv-1/note ACK: remote ack from http://icinga: alice: on it"
        );
        assert!(entries[5].starts_with("Note Response 200"));
    }

    #[tokio::test]
    async fn test_custom_creates_then_notes() {
        let (api, _, _) = run(NotificationType::Custom).await;
        assert_eq!(
            api.calls(),
            vec!["create".to_string(), "note srv-1 alice: on it".to_string()]
        );
    }

    #[tokio::test]
    async fn test_recovery_only_closes() {
        let alert = alert_for(NotificationType::Recovery);
        let expected = format!("action {} close", alert.id.clone().unwrap());

        let (api, responses, log) = run(NotificationType::Recovery).await;
        assert_eq!(api.calls(), vec![expected]);
        assert_eq!(responses.len(), 1);
        let request_at = log
            .find(&format!("Close Request PUT {}/action close", alert.id.unwrap()))
            .unwrap();
        assert!(request_at < log.find("Close Response 200").unwrap());
    }

    #[tokio::test]
    async fn test_problem_creates_once() {
        let (api, _, _) = run(NotificationType::Problem).await;
        assert_eq!(api.calls(), vec!["create".to_string()]);

        let created = api.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].value, "2/3 (HARD)");
    }

    #[tokio::test]
    async fn test_other_types_create() {
        for notification_type in [
            NotificationType::DowntimeStart,
            NotificationType::DowntimeEnd,
            NotificationType::DowntimeRemoved,
            NotificationType::FlappingStart,
            NotificationType::FlappingEnd,
        ] {
            let (api, _, _) = run(notification_type).await;
            assert_eq!(api.calls(), vec!["create".to_string()], "{}", notification_type);
        }
    }

    #[tokio::test]
    async fn test_ack_without_id_stops_after_create() {
        let alert = alert_for(NotificationType::Acknowledgement);
        let intent = LifecycleIntent::Acknowledge {
            note: "ACK".to_string(),
        };
        let mut api = Recorder::new("unused");
        api.create_body = "Internal Server Error".to_string();
        let mut audit = AuditLog::new(Vec::new());

        let result = dispatch(&api, &alert, &intent, &mut audit).await;

        assert!(matches!(result, Err(ClientError::MissingId { .. })));
        assert_eq!(api.calls(), vec!["create".to_string()]);
        let log = String::from_utf8(audit.into_inner()).unwrap();
        assert!(log.contains("Create Response 201 Internal Server Error"));
    }

    #[tokio::test]
    async fn test_close_without_id() {
        let alert = Alert::new("web01", "httpIp");
        let api = Recorder::new("srv-1");
        let mut audit = AuditLog::new(Vec::new());

        let result = dispatch(&api, &alert, &LifecycleIntent::Close, &mut audit).await;
        assert!(matches!(result, Err(ClientError::NoAlertId { .. })));
        assert!(api.calls().is_empty());
    }
}
