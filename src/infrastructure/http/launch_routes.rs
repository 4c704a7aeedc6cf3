//! Apply/revert API routes and launch detection status

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::application::services::ApplyMode;
use crate::domain::value_objects::{permission_grant_command, AppSettingsOutcome, ForegroundServiceOutcome};
use crate::infrastructure::state::AppState;

#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub package_name: String,
    pub outcome: AppSettingsOutcome,
    pub message: &'static str,
    /// Shell command that grants the secure settings permission, present on `NoPermission`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_command: Option<String>,
}

impl OutcomeResponse {
    fn new(state: &AppState, package_name: String, outcome: AppSettingsOutcome) -> Self {
        let permission_command = matches!(outcome, AppSettingsOutcome::NoPermission)
            .then(|| permission_grant_command(&state.config.app_package_name));
        Self {
            package_name,
            outcome,
            message: outcome.message(),
            permission_command,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LaunchDetectionStatus {
    pub enabled: bool,
    pub permission_granted: bool,
    pub applied_package: Option<String>,
    pub last_outcome: Option<ForegroundServiceOutcome>,
}

/// Write the launch values of a package's enabled rules
pub async fn apply_app_settings(
    State(state): State<Arc<AppState>>,
    Path(package_name): Path<String>,
) -> Json<OutcomeResponse> {
    let outcome = state.apply_service.run(&package_name, ApplyMode::Apply).await;
    Json(OutcomeResponse::new(&state, package_name, outcome))
}

/// Write the revert values of a package's enabled rules
pub async fn revert_app_settings(
    State(state): State<Arc<AppState>>,
    Path(package_name): Path<String>,
) -> Json<OutcomeResponse> {
    let outcome = state.apply_service.run(&package_name, ApplyMode::Revert).await;
    Json(OutcomeResponse::new(&state, package_name, outcome))
}

/// Launch shortcut entry point; applies only when auto-launch is switched on
pub async fn auto_launch(
    State(state): State<Arc<AppState>>,
    Path(package_name): Path<String>,
) -> Json<OutcomeResponse> {
    let user_data = state.user_data_service.get().await;
    let outcome = state.apply_service.auto_launch(&package_name, &user_data).await;
    Json(OutcomeResponse::new(&state, package_name, outcome))
}

pub async fn launch_detection_status(State(state): State<Arc<AppState>>) -> Json<LaunchDetectionStatus> {
    Json(LaunchDetectionStatus {
        enabled: state.user_data_service.get().await.use_usage_stats_service,
        permission_granted: state.foreground_service.is_permission_granted().await,
        applied_package: state.foreground_service.applied_package().await,
        last_outcome: state.launch_status.borrow().clone(),
    })
}
