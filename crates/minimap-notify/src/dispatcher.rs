use std::time::Duration;

use tracing::{error, info, warn};

use crate::category::NotificationContent;
use crate::error::NotifyError;
use crate::neynar::NotificationSink;

/// Total attempts per dispatch, counting the first call.
pub const MAX_ATTEMPTS: u32 = 2;

/// Delay before the retry attempt.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Delivery {
    /// Raw provider response.
    pub response: serde_json::Value,
    /// Which attempt succeeded (1-based).
    pub attempt: u32,
}

/// Publish with a bounded retry: any failure is retried once after
/// [`RETRY_DELAY`], then the last error is returned. The delay suspends only
/// the calling task.
pub async fn send_with_retry<S: NotificationSink>(
    sink: &S,
    target_fids: &[i64],
    notification: &NotificationContent,
) -> Result<Delivery, NotifyError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match sink.publish(target_fids, notification).await {
            Ok(response) => {
                info!(
                    "Notification sent to {} fids (attempt {})",
                    target_fids.len(),
                    attempt
                );
                return Ok(Delivery { response, attempt });
            }
            Err(err) if attempt < MAX_ATTEMPTS => {
                warn!(
                    "Notification API error (attempt {}/{}), retrying in {:?}: {}",
                    attempt, MAX_ATTEMPTS, RETRY_DELAY, err
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(err) => {
                error!("Notification API error after {} attempts: {}", MAX_ATTEMPTS, err);
                return Err(err);
            }
        }
    }
}
