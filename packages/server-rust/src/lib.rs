//! Gamestore server: the admin and storefront JSON API over an in-memory,
//! transactional entity store.

pub mod network;
pub mod service;
pub mod storage;
pub mod traits;

pub use network::{NetworkConfig, NetworkModule};
pub use service::{ServiceConfig, ServiceError};
pub use storage::MemoryStore;
pub use traits::CollectionSource;
