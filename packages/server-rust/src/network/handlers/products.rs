//! Product endpoints. Bodies are flat: product fields, the `productable`
//! kind tag, the child's fields and `category_ids` side by side under
//! `"product"`.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use gamestore_core::{EntityKind, Id, Product};

use super::error::ApiError;
use super::params::{listing_of, query_options, single, wrapped_attributes, QueryPairs};
use super::AppState;
use crate::service::{
    DeletionService, ModelLoadingService, ProductSaveRequest, ProductSavingService, ProductView,
};

const SINGULAR: &str = "product";
const PLURAL: &str = "products";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/v1/products", get(index).post(create))
        .route(
            "/admin/v1/products/{id}",
            get(show).patch(update).put(update).delete(destroy),
        )
}

pub async fn index(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = ModelLoadingService::new(state.store.collection::<Product>(), query_options(&pairs))
        .call()?;
    let views: Vec<ProductView> = state.store.read(|tables| {
        page.records
            .into_iter()
            .map(|product| ProductView::load(tables, product))
            .collect()
    });
    Ok(Json(listing_of(PLURAL, &views, page.pagination)?))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let product = state.store.find::<Product>(id)?;
    let view = state.store.read(|tables| ProductView::load(tables, product));
    Ok(Json(single(SINGULAR, &view)?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let attrs = wrapped_attributes(&body, SINGULAR)?;
    let request = ProductSaveRequest::from_body(None, &attrs);
    let view = ProductSavingService::new(&state.store, request).call()?;
    Ok(Json(single(SINGULAR, &view)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let attrs = wrapped_attributes(&body, SINGULAR)?;
    let request = ProductSaveRequest::from_body(Some(id), &attrs);
    let view = ProductSavingService::new(&state.store, request).call()?;
    Ok(Json(single(SINGULAR, &view)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    DeletionService::new(&state.store).delete(EntityKind::Product, id)?;
    Ok(StatusCode::NO_CONTENT)
}
