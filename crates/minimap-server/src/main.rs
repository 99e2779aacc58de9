use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use minimap_api::{AppState, AppStateInner};
use minimap_db::Database;
use minimap_notify::{NeynarClient, neynar::DEFAULT_API_URL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minimap=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let api_key = std::env::var("NEYNAR_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("NEYNAR_API_KEY not set; notification sends will fail");
    }
    let api_url =
        std::env::var("NEYNAR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
    let webhook_secret = std::env::var("NEYNAR_WEBHOOK_SECRET")
        .ok()
        .filter(|s| !s.is_empty());
    if webhook_secret.is_none() {
        warn!("NEYNAR_WEBHOOK_SECRET not set; webhook signature verification disabled");
    }
    let app_url =
        std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let db_path = std::env::var("MINIMAP_DB_PATH").unwrap_or_else(|_| "minimap.db".into());
    let host = std::env::var("MINIMAP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MINIMAP_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let notifier = NeynarClient::new(api_key, api_url);
    let state: AppState<NeynarClient> = Arc::new(AppStateInner {
        db,
        notifier,
        app_url,
        webhook_secret,
    });

    let app = Router::new()
        .nest("/api", minimap_api::api_router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Minimap backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
