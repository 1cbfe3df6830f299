//! Record deletion with explicit cascades and restrictions.
//!
//! | kind               | on delete                                         |
//! |--------------------|---------------------------------------------------|
//! | product            | its child (and the child's dependants), its links |
//! | category           | its links; products stay                          |
//! | game               | its licenses; refused while a product owns it     |
//! | system requirement | refused while any game references it              |
//! | anything else      | the record alone                                  |

use gamestore_core::{
    Category, Coupon, EntityKind, Game, Id, License, Product, ProductCategory, ProductableKind,
    SystemRequirement, User,
};
use tracing::info;

use super::error::ServiceError;
use super::productable;
use crate::storage::{MemoryStore, Transaction};

/// Base error returned when a system requirement is still in use.
pub const DEPENDENT_GAMES_EXIST: &str = "Cannot delete record because dependent games exist";

/// Base error returned when a productable child still has its product.
pub const DEPENDENT_PRODUCT_EXISTS: &str = "Cannot delete record because a dependent product exists";

#[derive(Debug, Clone, Copy)]
pub struct DeletionService<'a> {
    store: &'a MemoryStore,
}

impl<'a> DeletionService<'a> {
    #[must_use]
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Deletes record `id` of `kind` together with its dependants, all in
    /// one transaction.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] if there is no such record.
    /// - [`ServiceError::NotSaved`] with a `base` error if the record is
    ///   still referenced by a restricting relation; nothing is deleted.
    pub fn delete(&self, kind: EntityKind, id: Id) -> Result<(), ServiceError> {
        self.store.transaction(|tx| delete_in(tx, kind, id))?;
        info!(%kind, id, "record deleted");
        Ok(())
    }
}

fn delete_in(tx: &mut Transaction, kind: EntityKind, id: Id) -> Result<(), ServiceError> {
    match kind {
        EntityKind::Product => {
            let product = tx.delete::<Product>(id)?;
            if let Some(child) = productable::load(tx, &product) {
                productable::delete(tx, child.kind(), child.id())?;
            }
            tx.unlink("product_id", id);
        }
        EntityKind::Category => {
            tx.delete::<Category>(id)?;
            tx.unlink("category_id", id);
        }
        EntityKind::Game => {
            tx.find::<Game>(id)?;
            if !tx.products_owning(ProductableKind::Game, id).is_empty() {
                return Err(ServiceError::invalid("base", DEPENDENT_PRODUCT_EXISTS));
            }
            productable::delete(tx, ProductableKind::Game, id)?;
        }
        EntityKind::SystemRequirement => {
            tx.find::<SystemRequirement>(id)?;
            if !tx.games_requiring(id).is_empty() {
                return Err(ServiceError::invalid("base", DEPENDENT_GAMES_EXIST));
            }
            tx.delete::<SystemRequirement>(id)?;
        }
        EntityKind::License => {
            tx.delete::<License>(id)?;
        }
        EntityKind::Coupon => {
            tx.delete::<Coupon>(id)?;
        }
        EntityKind::User => {
            tx.delete::<User>(id)?;
        }
        EntityKind::ProductCategory => {
            tx.delete::<ProductCategory>(id)?;
        }
    }
    Ok(())
}
