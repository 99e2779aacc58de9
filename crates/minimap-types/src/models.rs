use serde::{Deserialize, Serialize};

/// Farcaster user as mirrored into the local store on sign-in events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub fid: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: String,
}

/// Notification credential for one user. The upsert path keeps at most one
/// row per fid; the (fid, token) uniqueness is the hard constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTokenRow {
    pub fid: i64,
    pub token: String,
    pub url: String,
    pub updated_at: String,
}

/// Append-only audit record, one per received webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventRow {
    pub id: i64,
    pub event_type: String,
    pub fid: Option<i64>,
    /// Raw JSON body as received.
    pub data: String,
    pub processed: bool,
    pub received_at: String,
}

/// Delivery receipt reported by the provider via `notification.sent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLogRow {
    pub id: i64,
    pub notification_id: Option<String>,
    pub fid: i64,
    pub success: bool,
    pub data: String,
    pub created_at: String,
}
