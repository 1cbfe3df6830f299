use axum::extract::State;
use axum::Json;
use serde_json::json;

use super::error::ApiError;
use super::AppState;
use crate::service::{StorefrontHome, StorefrontHomeService};

/// `GET /admin/v1/home`
pub async fn admin_home_handler() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// `GET /storefront/v1/home`
pub async fn storefront_home_handler(
    State(state): State<AppState>,
) -> Result<Json<StorefrontHome>, ApiError> {
    let home = StorefrontHomeService::new(state.store, (*state.services).clone()).call()?;
    Ok(Json(home))
}
