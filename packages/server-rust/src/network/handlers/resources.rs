//! CRUD handlers shared by every admin resource without a child record.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use gamestore_core::{Category, Coupon, Id, SystemRequirement, User};
use serde::Serialize;

use super::error::ApiError;
use super::params::{listing, query_options, single, wrapped_attributes, QueryPairs};
use super::AppState;
use crate::service::{DeletionService, ModelLoadingService, RecordSavingService};
use crate::storage::StoredEntity;

/// A record kind exposed under `/admin/v1/<PLURAL>`.
pub trait Resource: StoredEntity + Serialize + Default {
    /// Key wrapping one record in requests and responses.
    const SINGULAR: &'static str;
    /// Path segment and key wrapping a listing.
    const PLURAL: &'static str;
}

macro_rules! resource {
    ($($entity:ty => $singular:literal, $plural:literal);+ $(;)?) => {
        $(
            impl Resource for $entity {
                const SINGULAR: &'static str = $singular;
                const PLURAL: &'static str = $plural;
            }
        )+
    };
}

resource!(
    Category => "category", "categories";
    Coupon => "coupon", "coupons";
    SystemRequirement => "system_requirement", "system_requirements";
    User => "user", "users";
);

/// Index/create and show/update/destroy routes for `R`.
pub fn routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/admin/v1/{}", R::PLURAL),
            get(index::<R>).post(create::<R>),
        )
        .route(
            &format!("/admin/v1/{}/{{id}}", R::PLURAL),
            get(show::<R>)
                .patch(update::<R>)
                .put(update::<R>)
                .delete(destroy::<R>),
        )
}

pub async fn index<R: Resource>(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = ModelLoadingService::new(state.store.collection::<R>(), query_options(&pairs)).call()?;
    Ok(Json(listing(R::PLURAL, &page)?))
}

pub async fn show<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state.store.find::<R>(id)?;
    Ok(Json(single(R::SINGULAR, &record)?))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let attrs = wrapped_attributes(&body, R::SINGULAR)?;
    let record = RecordSavingService::new(&state.store).create(R::default(), &attrs)?;
    Ok(Json(single(R::SINGULAR, &record)?))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let attrs = wrapped_attributes(&body, R::SINGULAR)?;
    let record: R = RecordSavingService::new(&state.store).update(id, &attrs)?;
    Ok(Json(single(R::SINGULAR, &record)?))
}

pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    DeletionService::new(&state.store).delete(R::KIND, id)?;
    Ok(StatusCode::NO_CONTENT)
}
