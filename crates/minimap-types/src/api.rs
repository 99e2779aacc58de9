use serde::{Deserialize, Serialize};

use crate::models::{NotificationTokenRow, UserRow};

// Field names stay wire-compatible with the original web client
// (camelCase where it used camelCase, snake_case where it didn't).

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

// -- Webhook --

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

// -- Send notification --

/// Required fields are modeled as `Option` so the handler can reject missing
/// values with a 400 instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    #[serde(rename = "targetFids", alias = "target_fids")]
    pub target_fids: Option<Vec<i64>>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    #[serde(rename = "sentTo")]
    pub sent_to: usize,
    pub response: serde_json::Value,
    pub attempt: u32,
}

#[derive(Debug, Deserialize)]
pub struct TestNotificationQuery {
    pub fid: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TestNotificationResponse {
    pub success: bool,
    #[serde(rename = "sentTo")]
    pub sent_to: i64,
    pub response: serde_json::Value,
}

// -- Notification tokens --

#[derive(Debug, Deserialize)]
pub struct StoreTokenRequest {
    pub fid: Option<i64>,
    pub token: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreTokenResponse {
    pub success: bool,
    pub result: Vec<NotificationTokenRow>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTokenRequest {
    pub fid: Option<i64>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteTokenResponse {
    pub success: bool,
    pub deleted: usize,
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct SaveUserRequest {
    pub fid: Option<i64>,
    pub username: Option<String>,
    #[serde(alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveUserResponse {
    pub success: bool,
    pub result: Vec<UserRow>,
}
