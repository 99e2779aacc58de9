use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use minimap_types::api::{
    DeleteTokenRequest, DeleteTokenResponse, ErrorBody, StoreTokenRequest, StoreTokenResponse,
};

use crate::AppState;

/// `POST /api/store-notification-token` — client-driven token registration,
/// same replace-for-fid upsert the frame.added webhook uses.
pub async fn store<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<StoreTokenRequest>,
) -> Response
where
    S: Send + Sync + 'static,
{
    let (Some(fid), Some(token), Some(url)) = (
        req.fid.filter(|&fid| fid != 0),
        req.token.filter(|t| !t.is_empty()),
        req.url.filter(|u| !u.is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing required fields")),
        )
            .into_response();
    };

    let db = state.clone();
    let result = tokio::task::spawn_blocking(move || db.db.upsert_token(fid, &token, &url)).await;

    match result {
        Ok(Ok(row)) => {
            info!("Saved notification token for fid {} from client", fid);
            Json(StoreTokenResponse {
                success: true,
                result: vec![row],
            })
            .into_response()
        }
        Ok(Err(err)) => {
            error!("Error storing notification token: {}", err);
            internal_error("Failed to store token")
        }
        Err(err) => {
            error!("spawn_blocking join error: {}", err);
            internal_error("Failed to store token")
        }
    }
}

/// `POST /api/delete-notification-token` — deletes one row if a token is
/// given, otherwise every token for the fid.
pub async fn delete<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<DeleteTokenRequest>,
) -> Response
where
    S: Send + Sync + 'static,
{
    let Some(fid) = req.fid.filter(|&fid| fid != 0) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing required FID")),
        )
            .into_response();
    };

    let db = state.clone();
    let token = req.token;
    let result =
        tokio::task::spawn_blocking(move || db.db.delete_tokens(fid, token.as_deref())).await;

    match result {
        Ok(Ok(deleted)) => {
            info!(
                "Deleted notification tokens for fid {}. Rows affected: {}",
                fid, deleted
            );
            Json(DeleteTokenResponse {
                success: true,
                deleted,
            })
            .into_response()
        }
        Ok(Err(err)) => {
            error!("Error deleting notification token: {}", err);
            internal_error("Internal server error")
        }
        Err(err) => {
            error!("spawn_blocking join error: {}", err);
            internal_error("Internal server error")
        }
    }
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(message)),
    )
        .into_response()
}
