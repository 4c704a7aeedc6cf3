use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::value_objects::{SecureSetting, SettingType};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub setting_type: SettingType,
    #[serde(default)]
    pub text: String,
}

/// Search device settings keys by substring
pub async fn search_secure_settings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SecureSetting>>, (StatusCode, String)> {
    state
        .secure_settings_service
        .search(query.setting_type, &query.text)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}
