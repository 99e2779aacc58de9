use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use minimap_types::api::{ErrorBody, SaveUserRequest, SaveUserResponse};

use crate::AppState;

/// `POST /api/users/save` — mirror the signed-in Farcaster user into the
/// local store, idempotent on fid.
pub async fn save<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<SaveUserRequest>,
) -> Response
where
    S: Send + Sync + 'static,
{
    let (Some(fid), Some(username)) = (
        req.fid.filter(|&fid| fid != 0),
        req.username.filter(|u| !u.is_empty()),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Missing required fields")),
        )
            .into_response();
    };

    let db = state.clone();
    let display_name = req.display_name;
    let avatar_url = req.avatar_url;
    let username_for_log = username.clone();
    let result = tokio::task::spawn_blocking(move || {
        db.db
            .upsert_user(fid, &username, display_name.as_deref(), avatar_url.as_deref())
    })
    .await;

    match result {
        Ok(Ok(row)) => {
            info!("Saved user {} (fid {})", username_for_log, fid);
            Json(SaveUserResponse {
                success: true,
                result: vec![row],
            })
            .into_response()
        }
        Ok(Err(err)) => {
            error!("Error saving user: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to save user")),
            )
                .into_response()
        }
        Err(err) => {
            error!("spawn_blocking join error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to save user")),
            )
                .into_response()
        }
    }
}
