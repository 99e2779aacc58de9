//! HTTP API for the Minimap notification backend.
//!
//! Exposes an axum [`Router`] over the webhook event router, the
//! notification dispatcher and the token/user store endpoints. Generic over
//! the [`NotificationSink`] so tests can swap the provider client out.

pub mod notifications;
pub mod signature;
pub mod tokens;
pub mod users;
pub mod webhook;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use minimap_db::Database;
use minimap_notify::NotificationSink;

pub type AppState<S> = Arc<AppStateInner<S>>;

pub struct AppStateInner<S> {
    pub db: Database,
    pub notifier: S,
    /// Base URL notification target links are built from.
    pub app_url: String,
    /// Webhook signing secret. `None` disables verification (dev mode).
    pub webhook_secret: Option<String>,
}

/// Build the API router. Mount under `/api`:
///
/// ```rust,ignore
/// Router::new().nest("/api", minimap_api::api_router(state))
/// ```
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
    S: NotificationSink + Send + Sync + 'static,
{
    Router::new()
        .route("/webhook", post(webhook::handle::<S>))
        .route("/send-notification", post(notifications::send::<S>))
        .route("/test-notification", get(notifications::send_test::<S>))
        .route("/store-notification-token", post(tokens::store::<S>))
        .route("/delete-notification-token", post(tokens::delete::<S>))
        .route("/users/save", post(users::save::<S>))
        .with_state(state)
}
