//! App setting API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::application::services::{AppSettingsServiceError, UpdateAppSettingRequest};
use crate::domain::entities::{AppSetting, NewAppSetting};
use crate::domain::value_objects::{AppSettingId, SettingType};
use crate::infrastructure::state::AppState;

/// Request to add a rule to the package named in the path
#[derive(Debug, Deserialize)]
pub struct CreateAppSettingRequest {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub setting_type: SettingType,
    pub label: String,
    pub key: String,
    pub value_on_launch: String,
    pub value_on_revert: String,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct CleanResponse {
    pub removed_packages: Vec<String>,
}

pub(super) fn error_response(error: AppSettingsServiceError) -> (StatusCode, String) {
    let status = match &error {
        AppSettingsServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        AppSettingsServiceError::DuplicateKey { .. } => StatusCode::CONFLICT,
        AppSettingsServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        AppSettingsServiceError::NoInstalledPackages => StatusCode::CONFLICT,
        AppSettingsServiceError::Repository(_) | AppSettingsServiceError::Package(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, error.to_string())
}

/// List the rules of a package
pub async fn list_app_settings(
    State(state): State<Arc<AppState>>,
    Path(package_name): Path<String>,
) -> Result<Json<Vec<AppSetting>>, (StatusCode, String)> {
    state
        .app_settings_service
        .get_app_settings(&package_name)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Add a rule
pub async fn create_app_setting(
    State(state): State<Arc<AppState>>,
    Path(package_name): Path<String>,
    Json(req): Json<CreateAppSettingRequest>,
) -> Result<(StatusCode, Json<AppSetting>), (StatusCode, String)> {
    let new = NewAppSetting {
        enabled: req.enabled,
        setting_type: req.setting_type,
        package_name,
        label: req.label,
        key: req.key,
        value_on_launch: req.value_on_launch,
        value_on_revert: req.value_on_revert,
    };

    let stored = state
        .app_settings_service
        .add_app_setting(new)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Get a rule by ID
pub async fn get_app_setting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AppSetting>, (StatusCode, String)> {
    let id = AppSettingId::from_i64(id);
    state
        .app_settings_service
        .get_app_setting(id)
        .await
        .map_err(error_response)?
        .map(Json)
        .ok_or_else(|| error_response(AppSettingsServiceError::NotFound(id)))
}

pub async fn update_app_setting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAppSettingRequest>,
) -> Result<Json<AppSetting>, (StatusCode, String)> {
    state
        .app_settings_service
        .update_app_setting(AppSettingId::from_i64(id), req)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn set_app_setting_enabled(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<Json<AppSetting>, (StatusCode, String)> {
    state
        .app_settings_service
        .set_enabled(AppSettingId::from_i64(id), req.enabled)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_app_setting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .app_settings_service
        .delete_app_setting(AppSettingId::from_i64(id))
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove the rules of every package that is no longer installed
pub async fn clean_app_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CleanResponse>, (StatusCode, String)> {
    let removed_packages = state
        .app_settings_service
        .clean_app_settings()
        .await
        .map_err(error_response)?;

    Ok(Json(CleanResponse { removed_packages }))
}

/// Server-sent stream of a package's rule set, re-sent whenever it changes
pub async fn stream_app_settings(
    State(state): State<Arc<AppState>>,
    Path(package_name): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state
        .app_settings_service
        .observe_app_settings(&package_name)
        .map(|snapshot| {
            let event = match snapshot {
                Ok(rules) => Event::default()
                    .event("app-settings")
                    .json_data(&rules)
                    .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())),
                Err(e) => Event::default().event("error").data(e.to_string()),
            };
            Ok(event)
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}
