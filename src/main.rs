//! App Settings Engine - Per-app device settings toggled on launch
//!
//! The engine is a long-running service that:
//! - Stores, per target package, rules mapping a settings key to a launch and a revert value
//! - Writes those values into the system, secure and global settings tables
//! - Watches the foreground app and applies/reverts rules as apps come and go
//! - Exposes rule management and manual apply/revert over a REST API

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::launch_detection_worker::launch_detection_worker;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app_settings_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting App Settings Engine");

    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Storage: {:?} ({})", config.storage_backend, config.database_url);
    tracing::info!("  Platform: {:?}", config.platform_backend);
    tracing::info!("  Permission target: {}", config.app_package_name);
    let port = config.server_port;

    let state = Arc::new(AppState::new(config).await?);
    tracing::info!("Application state initialized");

    let launch_worker = {
        let foreground_service = state.foreground_service.clone();
        let user_data_service = state.user_data_service.clone();
        let launch_status = state.launch_status.clone();
        let poll_interval = state.config.usage_poll_interval;
        tokio::spawn(async move {
            launch_detection_worker(foreground_service, user_data_service, launch_status, poll_interval).await;
        })
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping launch detection");
            launch_worker.abort();
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
