//! Store operations on a product's child, dispatched by kind.

use gamestore_core::{FieldErrors, Game, Id, License, Product, Productable, ProductableKind};
use tracing::debug;

use crate::storage::{StoreError, Transaction};

/// The stored child `product` points at, if any.
#[must_use]
pub fn load(tx: &Transaction, product: &Product) -> Option<Productable> {
    match (product.productable_type?, product.productable_id?) {
        (ProductableKind::Game, id) => tx.get::<Game>(id).cloned().map(Productable::Game),
    }
}

/// Own validations plus store-dependent rules of the child.
#[must_use]
pub fn check(tx: &Transaction, child: &Productable) -> FieldErrors {
    match child {
        Productable::Game(game) => tx.check(game),
    }
}

/// # Errors
///
/// Propagates [`Transaction::persist`] failures.
pub fn persist(tx: &mut Transaction, child: &mut Productable) -> Result<(), StoreError> {
    match child {
        Productable::Game(game) => tx.persist(game),
    }
}

/// Deletes a child and whatever depends on it. A game takes its licenses
/// with it.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if the child does not exist.
pub fn delete(tx: &mut Transaction, kind: ProductableKind, id: Id) -> Result<(), StoreError> {
    match kind {
        ProductableKind::Game => {
            let licenses = tx.licenses_of(id);
            for license in &licenses {
                tx.delete::<License>(license.id)?;
            }
            tx.delete::<Game>(id)?;
            debug!(game = id, licenses = licenses.len(), "deleted game");
        }
    }
    Ok(())
}
