//! Product sections shown on the storefront home page.

use std::sync::Arc;

use chrono::{Duration, Utc};
use gamestore_core::{Game, Id, Product, ProductableKind, QueryOptions, SortDirection, Value};
use rand::seq::IndexedRandom;
use serde::Serialize;

use super::config::ServiceConfig;
use super::error::ServiceError;
use super::loading::ModelLoadingService;
use crate::storage::MemoryStore;

/// The compact product shape used by storefront listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorefrontProduct {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl From<Product> for StorefrontProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorefrontHome {
    pub featured: Vec<StorefrontProduct>,
    pub last_releases: Vec<StorefrontProduct>,
    pub cheapest: Vec<StorefrontProduct>,
}

#[derive(Debug)]
pub struct StorefrontHomeService {
    store: Arc<MemoryStore>,
    config: ServiceConfig,
}

impl StorefrontHomeService {
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Builds all three sections.
    ///
    /// - `featured`: a random sample of featured products
    /// - `last_releases`: a random sample of products whose game came out
    ///   within the release window
    /// - `cheapest`: the lowest-priced products that are not featured
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Storage`] if the store cannot be read.
    pub fn call(&self) -> Result<StorefrontHome, ServiceError> {
        Ok(StorefrontHome {
            featured: self.featured()?,
            last_releases: self.last_releases()?,
            cheapest: self.cheapest()?,
        })
    }

    fn section_size(&self) -> usize {
        usize::try_from(self.config.home_section_size).unwrap_or(usize::MAX)
    }

    fn sample(&self, products: &[Product]) -> Vec<StorefrontProduct> {
        products
            .choose_multiple(&mut rand::rng(), self.section_size())
            .cloned()
            .map(StorefrontProduct::from)
            .collect()
    }

    fn featured(&self) -> Result<Vec<StorefrontProduct>, ServiceError> {
        let products = self
            .store
            .collection::<Product>()
            .where_eq("featured", true)
            .load()?;
        Ok(self.sample(&products))
    }

    fn last_releases(&self) -> Result<Vec<StorefrontProduct>, ServiceError> {
        let since = Utc::now() - Duration::days(self.config.release_window_days);
        let games: Vec<Value> = self
            .store
            .collection::<Game>()
            .where_gte("release_date", since.timestamp_millis())
            .load()?
            .iter()
            .map(|game| Value::from(game.id))
            .collect();
        let products = self
            .store
            .collection::<Product>()
            .where_eq("productable_type", ProductableKind::Game.as_str())
            .where_in("productable_id", games)
            .load()?;
        Ok(self.sample(&products))
    }

    fn cheapest(&self) -> Result<Vec<StorefrontProduct>, ServiceError> {
        let options = QueryOptions::default()
            .with_order("price", SortDirection::Asc)
            .with_page(1, self.config.home_section_size);
        let collection = self.store.collection::<Product>().where_eq("featured", false);
        let page = ModelLoadingService::new(collection, options).call()?;
        Ok(page.records.into_iter().map(StorefrontProduct::from).collect())
    }
}
