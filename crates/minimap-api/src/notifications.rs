use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use minimap_notify::{
    MAX_ATTEMPTS, NotificationContent, NotificationSink, NotifyCategory, send_with_retry,
};
use minimap_types::api::{
    ErrorBody, SendNotificationRequest, SendNotificationResponse, TestNotificationQuery,
    TestNotificationResponse,
};

use crate::AppState;

/// `POST /api/send-notification` — bulk send with bounded retry.
/// Validation failures reject before any provider call.
pub async fn send<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<SendNotificationRequest>,
) -> Response
where
    S: NotificationSink + Send + Sync + 'static,
{
    let target_fids = req.target_fids.unwrap_or_default();
    let category_raw = req.category.unwrap_or_default();

    if target_fids.is_empty() || category_raw.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing targetFids or category")),
        )
            .into_response();
    }

    let Some(category) = NotifyCategory::parse(&category_raw) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Invalid category")),
        )
            .into_response();
    };

    info!(
        "Dispatching {} notification to {} fids",
        category.as_str(),
        target_fids.len()
    );

    let content = category.content(&state.app_url);
    match send_with_retry(&state.notifier, &target_fids, &content).await {
        Ok(delivery) => Json(SendNotificationResponse {
            success: true,
            sent_to: target_fids.len(),
            response: delivery.response,
            attempt: delivery.attempt,
        })
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(format!(
                "Neynar API error after {} attempts: {}",
                MAX_ATTEMPTS, err
            ))),
        )
            .into_response(),
    }
}

/// `GET /api/test-notification?fid=N` — single fixed notification, no retry.
pub async fn send_test<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<TestNotificationQuery>,
) -> Response
where
    S: NotificationSink + Send + Sync + 'static,
{
    let Some(fid) = query.fid.filter(|&fid| fid != 0) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing FID parameter in query")),
        )
            .into_response();
    };

    let content = NotificationContent::test_message(&state.app_url);
    match state.notifier.publish(&[fid], &content).await {
        Ok(response) => Json(TestNotificationResponse {
            success: true,
            sent_to: fid,
            response,
        })
        .into_response(),
        Err(err) => {
            error!("Error sending test notification to fid {}: {}", fid, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(format!(
                    "Failed to send test notification: {}",
                    err
                ))),
            )
                .into_response()
        }
    }
}
