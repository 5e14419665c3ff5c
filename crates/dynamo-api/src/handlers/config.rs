use crate::state::AppState;
use axum::{extract::State, Json};
use dynamo_core::Settings;
use std::sync::Arc;

/// `GET /meta/config`: the effective settings. Credential fields are never serialized.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Settings> {
    Json(Settings::clone(&state.settings))
}
