//! License endpoints, nested under their game for listing and creation and
//! shallow for everything else.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use gamestore_core::{EntityKind, Id, License};

use super::error::ApiError;
use super::params::{listing, query_options, single, wrapped_attributes, QueryPairs};
use super::AppState;
use crate::service::{DeletionService, ModelLoadingService, RecordSavingService};

const SINGULAR: &str = "license";
const PLURAL: &str = "licenses";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/v1/games/{game_id}/licenses", get(index).post(create))
        .route(
            "/admin/v1/licenses/{id}",
            get(show).patch(update).put(update).delete(destroy),
        )
}

/// Licenses of one game. An unknown game simply has none.
pub async fn index(
    State(state): State<AppState>,
    Path(game_id): Path<Id>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let licenses = state.store.collection::<License>().where_eq("game_id", game_id);
    let page = ModelLoadingService::new(licenses, query_options(&pairs)).call()?;
    Ok(Json(listing(PLURAL, &page)?))
}

/// An unknown game is reported as a `game` field error.
pub async fn create(
    State(state): State<AppState>,
    Path(game_id): Path<Id>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let attrs = wrapped_attributes(&body, SINGULAR)?;
    let license = RecordSavingService::new(&state.store).create(License::for_game(game_id), &attrs)?;
    Ok(Json(single(SINGULAR, &license)?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let license = state.store.find::<License>(id)?;
    Ok(Json(single(SINGULAR, &license)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let attrs = wrapped_attributes(&body, SINGULAR)?;
    let license: License = RecordSavingService::new(&state.store).update(id, &attrs)?;
    Ok(Json(single(SINGULAR, &license)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    DeletionService::new(&state.store).delete(EntityKind::License, id)?;
    Ok(StatusCode::NO_CONTENT)
}
