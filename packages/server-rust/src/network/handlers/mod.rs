//! HTTP handlers for the gamestore API.
//!
//! Defines `AppState`, the state carried through axum extractors, and the
//! route table of every resource.

pub mod error;
pub mod health;
pub mod home;
pub mod licenses;
pub mod params;
pub mod products;
pub mod resources;

pub use error::ApiError;
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use home::{admin_home_handler, storefront_home_handler};
pub use resources::Resource;

use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use gamestore_core::{Category, Coupon, SystemRequirement, User};

use super::{NetworkConfig, ShutdownController};
use crate::service::ServiceConfig;
use crate::storage::MemoryStore;

/// Shared application state passed to all handlers via `State` extraction.
///
/// Holds `Arc`s only, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub services: Arc<ServiceConfig>,
    /// Health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Process start, for uptime.
    pub start_time: Instant,
}

/// Every admin and storefront route. Health probes are added separately so
/// they stay reachable while the server drains.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/v1/home", get(admin_home_handler))
        .merge(resources::routes::<Category>())
        .merge(resources::routes::<Coupon>())
        .merge(resources::routes::<SystemRequirement>())
        .merge(resources::routes::<User>())
        .merge(products::routes())
        .merge(licenses::routes())
        .route("/storefront/v1/home", get(storefront_home_handler))
}

/// `/health`, `/health/live` and `/health/ready`.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
}
