use std::future::Future;

use tracing::debug;

use crate::category::NotificationContent;
use crate::error::NotifyError;

pub const DEFAULT_API_URL: &str = "https://api.neynar.com";

/// Seam between the dispatcher and the provider, so the retry path can be
/// exercised without network access.
pub trait NotificationSink {
    /// Publish one notification to a batch of fids. The provider filters out
    /// recipients who disabled notifications; callers don't pre-filter.
    fn publish(
        &self,
        target_fids: &[i64],
        notification: &NotificationContent,
    ) -> impl Future<Output = Result<serde_json::Value, NotifyError>> + Send;
}

/// Neynar frame-notification API client.
#[derive(Clone)]
pub struct NeynarClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NeynarClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

impl NotificationSink for NeynarClient {
    async fn publish(
        &self,
        target_fids: &[i64],
        notification: &NotificationContent,
    ) -> Result<serde_json::Value, NotifyError> {
        debug!(
            "Calling notification API for {} fids: {}",
            target_fids.len(),
            notification.title
        );

        let res = self
            .http
            .post(format!(
                "{}/v2/farcaster/frame/notifications",
                self.base_url.trim_end_matches('/')
            ))
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({
                "target_fids": target_fids,
                "notification": notification,
            }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(res.json().await?)
    }
}
