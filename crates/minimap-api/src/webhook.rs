use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use minimap_db::Database;
use minimap_types::api::{ErrorBody, WebhookAck};
use minimap_types::events::{EventKind, WebhookPayload};

use crate::AppState;
use crate::signature;

/// Result of the primary store mutation for an event.
#[derive(Debug, PartialEq, Eq)]
pub enum PrimaryOutcome {
    /// The mutation was performed.
    Applied,
    /// Nothing to do for this payload (with the reason).
    Skipped(&'static str),
    /// The store write failed; logged, never surfaced to the caller.
    Failed(String),
}

/// Result of the best-effort audit insert, reported separately from the
/// primary mutation so both can be asserted on independently.
#[derive(Debug, PartialEq, Eq)]
pub enum AuditOutcome {
    Recorded,
    Failed(String),
    /// No audit row is written when a required field is missing.
    Skipped,
}

#[derive(Debug)]
pub struct WebhookOutcome {
    /// Canonical event type name, as stored in the audit trail.
    pub event_type: String,
    pub primary: PrimaryOutcome,
    pub audit: AuditOutcome,
}

/// `POST /api/webhook` — signature gate, classify, dispatch.
///
/// Once the body parses, the response is always `200 {"success":true}` even
/// if a store write failed: surfacing handler errors would make the provider
/// retry delivery indefinitely.
pub async fn handle<S>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: Send + Sync + 'static,
{
    if let Some(secret) = &state.webhook_secret {
        let header = headers
            .get(signature::SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        let verified = match header {
            Some(sig) => signature::verify(secret, &body, sig),
            None => false,
        };
        if !verified {
            warn!("Webhook rejected: missing or invalid signature");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Invalid webhook signature")),
            )
                .into_response();
        }
    }

    let raw: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            error!("Error processing webhook: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to process webhook")),
            )
                .into_response();
        }
    };

    let payload: WebhookPayload = match serde_json::from_value(raw.clone()) {
        Ok(payload) => payload,
        Err(err) => {
            error!("Error processing webhook: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to process webhook")),
            )
                .into_response();
        }
    };

    // Blocking sqlite work runs off the async runtime
    let db_state = state.clone();
    let raw_text = raw.to_string();
    let joined = tokio::task::spawn_blocking(move || {
        route_event(&db_state.db, &payload, &raw_text)
    })
    .await;

    match joined {
        Ok(outcome) => {
            info!(
                "Webhook {} handled: primary={:?} audit={:?}",
                outcome.event_type, outcome.primary, outcome.audit
            );
        }
        Err(err) => {
            // Classification already happened; the caller still gets a 200.
            error!("spawn_blocking join error: {}", err);
        }
    }

    Json(WebhookAck { success: true }).into_response()
}

/// Dispatch one classified event to its store mutations. Store errors are
/// captured in the outcome and logged; nothing here fails the request.
pub fn route_event(db: &Database, payload: &WebhookPayload, raw: &str) -> WebhookOutcome {
    let kind = payload.classify();
    let event_type = kind.canonical().to_string();

    match kind {
        EventKind::UserCreated => {
            let user = payload.user.as_ref();
            let Some(fid) = user.and_then(|u| u.fid) else {
                warn!("user.created event missing user.fid, skipping");
                return skipped(event_type, "missing user.fid");
            };
            let username = user
                .and_then(|u| u.username.clone())
                .unwrap_or_else(|| format!("user-{}", fid));
            let display_name = user.and_then(|u| u.display_name.as_deref());
            let avatar_url = user.and_then(|u| u.avatar_url.as_deref());

            let primary = match db.upsert_user(fid, &username, display_name, avatar_url) {
                Ok(_) => PrimaryOutcome::Applied,
                Err(err) => {
                    error!("Error saving user for fid {}: {}", fid, err);
                    PrimaryOutcome::Failed(err.to_string())
                }
            };
            let audit = record_audit(db, &event_type, Some(fid), raw, true);
            WebhookOutcome { event_type, primary, audit }
        }

        EventKind::FrameAdded => {
            let Some(fid) = payload.subject_fid() else {
                warn!("frame.added event missing fid, skipping");
                return skipped(event_type, "missing fid");
            };

            let details = payload.notification_details.as_ref().and_then(|d| {
                match (d.url.as_deref(), d.token.as_deref()) {
                    (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => {
                        Some((url, token))
                    }
                    _ => None,
                }
            });

            let primary = match details {
                Some((url, token)) => match db.upsert_token(fid, token, url) {
                    Ok(_) => {
                        info!("Stored notification token for fid {}", fid);
                        PrimaryOutcome::Applied
                    }
                    Err(err) => {
                        error!("Error storing notification token for fid {}: {}", fid, err);
                        PrimaryOutcome::Failed(err.to_string())
                    }
                },
                None => PrimaryOutcome::Skipped("no notification details"),
            };
            let audit = record_audit(db, &event_type, Some(fid), raw, true);
            WebhookOutcome { event_type, primary, audit }
        }

        EventKind::FrameRemoved | EventKind::NotificationsDisabled => {
            let Some(fid) = payload.subject_fid() else {
                warn!("{} event missing fid, skipping", event_type);
                return skipped(event_type, "missing fid");
            };

            let primary = match db.delete_tokens(fid, None) {
                Ok(deleted) => {
                    info!("Deleted {} notification token(s) for fid {}", deleted, fid);
                    PrimaryOutcome::Applied
                }
                Err(err) => {
                    error!("Error deleting notification tokens for fid {}: {}", fid, err);
                    PrimaryOutcome::Failed(err.to_string())
                }
            };
            let audit = record_audit(db, &event_type, Some(fid), raw, true);
            WebhookOutcome { event_type, primary, audit }
        }

        EventKind::NotificationSent => {
            let Some(fid) = payload.subject_fid() else {
                warn!("notification.sent event missing fid, skipping");
                return skipped(event_type, "missing fid");
            };
            let Some(success) = payload.success else {
                warn!("notification.sent event missing delivery outcome, skipping");
                return skipped(event_type, "missing delivery outcome");
            };

            let primary = match db.insert_notification_log(
                payload.notification_id.as_deref(),
                fid,
                success,
                raw,
            ) {
                Ok(()) => PrimaryOutcome::Applied,
                Err(err) => {
                    error!("Error logging notification receipt for fid {}: {}", fid, err);
                    PrimaryOutcome::Failed(err.to_string())
                }
            };
            let audit = record_audit(db, &event_type, Some(fid), raw, true);
            WebhookOutcome { event_type, primary, audit }
        }

        EventKind::Unclassified(_) => {
            let audit = record_audit(db, &event_type, payload.subject_fid(), raw, false);
            WebhookOutcome {
                event_type,
                primary: PrimaryOutcome::Skipped("unclassified event"),
                audit,
            }
        }
    }
}

fn skipped(event_type: String, reason: &'static str) -> WebhookOutcome {
    WebhookOutcome {
        event_type,
        primary: PrimaryOutcome::Skipped(reason),
        audit: AuditOutcome::Skipped,
    }
}

fn record_audit(
    db: &Database,
    event_type: &str,
    fid: Option<i64>,
    raw: &str,
    processed: bool,
) -> AuditOutcome {
    match db.insert_webhook_event(event_type, fid, raw, processed) {
        Ok(()) => AuditOutcome::Recorded,
        Err(err) => {
            error!("Error storing webhook event: {}", err);
            AuditOutcome::Failed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn payload(json: &str) -> (WebhookPayload, String) {
        (serde_json::from_str(json).unwrap(), json.to_string())
    }

    #[test]
    fn frame_added_without_details_skips_primary_but_audits() {
        let db = db();
        let (p, raw) = payload(r#"{"event":"frame.added","fid":42}"#);

        let outcome = route_event(&db, &p, &raw);
        assert_eq!(outcome.primary, PrimaryOutcome::Skipped("no notification details"));
        assert_eq!(outcome.audit, AuditOutcome::Recorded);
        assert!(db.list_tokens(42).unwrap().is_empty());

        let events = db.recent_webhook_events(10).unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].processed);
    }

    #[test]
    fn missing_fid_writes_nothing_at_all() {
        let db = db();
        let (p, raw) = payload(r#"{"event":"frame.removed"}"#);

        let outcome = route_event(&db, &p, &raw);
        assert_eq!(outcome.primary, PrimaryOutcome::Skipped("missing fid"));
        assert_eq!(outcome.audit, AuditOutcome::Skipped);
        assert!(db.recent_webhook_events(10).unwrap().is_empty());
    }

    #[test]
    fn notification_sent_requires_delivery_outcome() {
        let db = db();
        let (p, raw) = payload(r#"{"event":"notification.sent","fid":9}"#);

        let outcome = route_event(&db, &p, &raw);
        assert_eq!(outcome.primary, PrimaryOutcome::Skipped("missing delivery outcome"));
        assert_eq!(db.count_notification_logs(9).unwrap(), 0);

        let (p, raw) = payload(
            r#"{"event":"notification.sent","fid":9,"notification_id":"n-1","success":true}"#,
        );
        let outcome = route_event(&db, &p, &raw);
        assert_eq!(outcome.primary, PrimaryOutcome::Applied);
        assert_eq!(outcome.audit, AuditOutcome::Recorded);
        assert_eq!(db.count_notification_logs(9).unwrap(), 1);
    }

    #[test]
    fn user_created_upserts_user_from_nested_object() {
        let db = db();
        let (p, raw) = payload(
            r#"{"type":"user.created","user":{"fid":7,"username":"bob","displayName":"Bob"}}"#,
        );

        let outcome = route_event(&db, &p, &raw);
        assert_eq!(outcome.primary, PrimaryOutcome::Applied);

        let user = db.get_user(7).unwrap().unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.display_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn unclassified_event_is_recorded_unprocessed() {
        let db = db();
        let (p, raw) = payload(r#"{"event":"frame.pinned","fid":3}"#);

        let outcome = route_event(&db, &p, &raw);
        assert_eq!(outcome.event_type, "frame.pinned");
        assert_eq!(outcome.primary, PrimaryOutcome::Skipped("unclassified event"));
        assert_eq!(outcome.audit, AuditOutcome::Recorded);

        let events = db.recent_webhook_events(10).unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].processed);
        assert_eq!(events[0].fid, Some(3));
    }
}
