//! HTTP REST API routes

mod app_setting_routes;
mod launch_routes;
mod secure_settings_routes;
mod user_data_routes;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use app_setting_routes::*;
pub use launch_routes::*;
pub use secure_settings_routes::*;
pub use user_data_routes::*;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // App setting routes
        .route(
            "/api/packages/{package}/app-settings",
            get(app_setting_routes::list_app_settings).post(app_setting_routes::create_app_setting),
        )
        .route(
            "/api/packages/{package}/app-settings/stream",
            get(app_setting_routes::stream_app_settings),
        )
        .route(
            "/api/app-settings/{id}",
            get(app_setting_routes::get_app_setting)
                .put(app_setting_routes::update_app_setting)
                .delete(app_setting_routes::delete_app_setting),
        )
        .route(
            "/api/app-settings/{id}/enabled",
            post(app_setting_routes::set_app_setting_enabled),
        )
        .route("/api/app-settings/clean", post(app_setting_routes::clean_app_settings))
        // Apply / revert
        .route("/api/packages/{package}/apply", post(launch_routes::apply_app_settings))
        .route("/api/packages/{package}/revert", post(launch_routes::revert_app_settings))
        .route("/api/packages/{package}/auto-launch", post(launch_routes::auto_launch))
        .route(
            "/api/launch-detection/status",
            get(launch_routes::launch_detection_status),
        )
        // Device settings lookup
        .route(
            "/api/secure-settings",
            get(secure_settings_routes::search_secure_settings),
        )
        // User data
        .route(
            "/api/user-data",
            get(user_data_routes::get_user_data).put(user_data_routes::update_user_data),
        )
        .route("/api/user-data/reset", post(user_data_routes::reset_user_data))
        .route("/api/user-data/auto-launch", put(user_data_routes::set_auto_launch))
        .route(
            "/api/user-data/usage-stats-service",
            put(user_data_routes::set_usage_stats_service),
        )
}
