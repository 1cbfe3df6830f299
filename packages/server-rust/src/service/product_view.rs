use gamestore_core::{Category, Game, Id, Product, ProductCategory, Productable, ProductableKind};
use serde::Serialize;

use crate::storage::Tables;

/// A product with its child and current categories, as rendered by the API.
///
/// The child serializes under its kind next to the product's own fields:
/// `{"id": 1, ..., "productable": "game", "game": {...}, "categories": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[serde(flatten)]
    pub productable: Option<Productable>,
    pub categories: Vec<Category>,
}

impl ProductView {
    /// Resolves the child and categories of `product` from `tables`.
    ///
    /// Dangling references are skipped rather than reported.
    #[must_use]
    pub fn load(tables: &Tables, product: Product) -> Self {
        let productable = match (product.productable_type, product.productable_id) {
            (Some(ProductableKind::Game), Some(id)) => {
                tables.table::<Game>().get(id).cloned().map(Productable::Game)
            }
            _ => None,
        };
        let categories = categories_of(tables, product.id);
        Self {
            product,
            productable,
            categories,
        }
    }
}

/// Categories linked to `product_id`, in link order.
#[must_use]
pub fn categories_of(tables: &Tables, product_id: Id) -> Vec<Category> {
    let categories = tables.table::<Category>();
    tables
        .table::<ProductCategory>()
        .entities()
        .filter(|link| link.product_id == product_id)
        .filter_map(|link| categories.get(link.category_id).cloned())
        .collect()
}
