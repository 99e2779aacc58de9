use serde::Deserialize;

/// Lifecycle events delivered by the Farcaster notification provider.
///
/// Providers have shipped both dotted (`frame.added`) and snake_case
/// (`frame_added`) spellings, so classification accepts both and audit
/// records always store the canonical dotted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    UserCreated,
    FrameAdded,
    FrameRemoved,
    NotificationsDisabled,
    NotificationSent,
    /// Anything we don't recognize, keeping the raw label (if any) for the
    /// audit trail.
    Unclassified(Option<String>),
}

impl EventKind {
    pub fn classify(label: Option<&str>) -> Self {
        match label {
            Some("user.created") => Self::UserCreated,
            Some("frame.added") | Some("frame_added") => Self::FrameAdded,
            Some("frame.removed") | Some("frame_removed") => Self::FrameRemoved,
            Some("notifications.disabled") | Some("notifications_disabled") => {
                Self::NotificationsDisabled
            }
            Some("notification.sent") => Self::NotificationSent,
            Some(other) => Self::Unclassified(Some(other.to_string())),
            None => Self::Unclassified(None),
        }
    }

    /// Canonical name stored in the webhook_events audit table.
    pub fn canonical(&self) -> &str {
        match self {
            Self::UserCreated => "user.created",
            Self::FrameAdded => "frame.added",
            Self::FrameRemoved => "frame.removed",
            Self::NotificationsDisabled => "notifications.disabled",
            Self::NotificationSent => "notification.sent",
            Self::Unclassified(Some(label)) => label,
            Self::Unclassified(None) => "unknown",
        }
    }
}

/// Raw webhook body. Tolerant of extra fields; everything is optional and
/// per-event requirements are checked by the router.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub event: Option<String>,
    pub event_type: Option<String>,
    pub fid: Option<i64>,
    pub user: Option<WebhookUser>,
    pub frame_id: Option<String>,
    #[serde(rename = "notificationDetails", alias = "notification_details")]
    pub notification_details: Option<NotificationDetails>,
    pub notification_id: Option<String>,
    pub success: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookUser {
    pub fid: Option<i64>,
    pub username: Option<String>,
    #[serde(rename = "displayName", alias = "display_name")]
    pub display_name: Option<String>,
    #[serde(rename = "pfpUrl", alias = "pfp_url", alias = "avatar_url")]
    pub avatar_url: Option<String>,
}

/// Per-user notification credential issued when a frame is added.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationDetails {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl WebhookPayload {
    /// Event label resolution: first non-empty of `type`, `event`,
    /// `event_type` wins.
    pub fn event_label(&self) -> Option<&str> {
        [&self.kind, &self.event, &self.event_type]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }

    pub fn classify(&self) -> EventKind {
        EventKind::classify(self.event_label())
    }

    /// Subject fid: top-level field, falling back to the nested user object.
    pub fn subject_fid(&self) -> Option<i64> {
        self.fid.or_else(|| self.user.as_ref().and_then(|u| u.fid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> WebhookPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn classifies_dotted_and_snake_case() {
        assert_eq!(
            EventKind::classify(Some("frame.added")),
            EventKind::FrameAdded
        );
        assert_eq!(
            EventKind::classify(Some("frame_added")),
            EventKind::FrameAdded
        );
        assert_eq!(
            EventKind::classify(Some("notifications_disabled")),
            EventKind::NotificationsDisabled
        );
        assert_eq!(
            EventKind::classify(Some("frame_removed")).canonical(),
            "frame.removed"
        );
    }

    #[test]
    fn unknown_labels_are_unclassified() {
        assert_eq!(
            EventKind::classify(Some("frame.pinned")),
            EventKind::Unclassified(Some("frame.pinned".to_string()))
        );
        assert_eq!(EventKind::classify(None), EventKind::Unclassified(None));
        assert_eq!(EventKind::classify(None).canonical(), "unknown");
    }

    #[test]
    fn first_nonempty_label_wins() {
        let p = payload(r#"{"type":"frame.added","event":"frame.removed"}"#);
        assert_eq!(p.event_label(), Some("frame.added"));

        // Empty strings are skipped, not treated as a label.
        let p = payload(r#"{"type":"","event":"frame.removed"}"#);
        assert_eq!(p.event_label(), Some("frame.removed"));

        let p = payload(r#"{"event_type":"user.created"}"#);
        assert_eq!(p.classify(), EventKind::UserCreated);

        let p = payload(r#"{"fid":1}"#);
        assert_eq!(p.event_label(), None);
    }

    #[test]
    fn subject_fid_falls_back_to_nested_user() {
        let p = payload(r#"{"event":"user.created","user":{"fid":77,"username":"alice"}}"#);
        assert_eq!(p.subject_fid(), Some(77));

        let p = payload(r#"{"event":"frame.added","fid":42}"#);
        assert_eq!(p.subject_fid(), Some(42));
    }

    #[test]
    fn notification_details_accepts_both_casings() {
        let p = payload(
            r#"{"event":"frame.added","fid":1,"notificationDetails":{"url":"https://x/n","token":"t1"}}"#,
        );
        assert_eq!(p.notification_details.unwrap().token.as_deref(), Some("t1"));

        let p = payload(
            r#"{"event":"frame.added","fid":1,"notification_details":{"url":"https://x/n","token":"t2"}}"#,
        );
        assert_eq!(p.notification_details.unwrap().token.as_deref(), Some("t2"));
    }
}
