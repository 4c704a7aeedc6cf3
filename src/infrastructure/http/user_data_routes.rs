use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::value_objects::UserData;
use crate::infrastructure::state::AppState;

pub async fn get_user_data(State(state): State<Arc<AppState>>) -> Json<UserData> {
    Json(state.user_data_service.get().await)
}

pub async fn update_user_data(
    State(state): State<Arc<AppState>>,
    Json(user_data): Json<UserData>,
) -> Result<Json<UserData>, (StatusCode, String)> {
    state
        .user_data_service
        .update(user_data)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(user_data))
}

pub async fn reset_user_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserData>, (StatusCode, String)> {
    state
        .user_data_service
        .reset()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct TogglePreferenceRequest {
    pub enabled: bool,
}

pub async fn set_auto_launch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TogglePreferenceRequest>,
) -> Result<Json<UserData>, (StatusCode, String)> {
    state
        .user_data_service
        .set_auto_launch(req.enabled)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Switch launch detection on or off; the worker picks it up on its next check
pub async fn set_usage_stats_service(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TogglePreferenceRequest>,
) -> Result<Json<UserData>, (StatusCode, String)> {
    state
        .user_data_service
        .set_usage_stats_service(req.enabled)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
