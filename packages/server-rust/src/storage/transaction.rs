//! Staged write access used inside [`MemoryStore::transaction`](super::MemoryStore::transaction).

use std::collections::BTreeSet;

use gamestore_core::validation::{MUST_EXIST, TAKEN};
use gamestore_core::{
    Entity, FieldErrors, Game, Id, License, Product, ProductCategory, ProductableKind,
};
use tracing::trace;

use super::collection::{Predicate, QuerySpec};
use super::error::StoreError;
use super::tables::{StoredEntity, Tables};

/// A staged copy of every table.
///
/// Reads see the transaction's own earlier writes. Nothing here is visible
/// to other readers until the owning closure returns `Ok`.
#[derive(Debug)]
pub struct Transaction {
    staged: Tables,
}

impl Transaction {
    pub(crate) fn new(staged: Tables) -> Self {
        Self { staged }
    }

    pub(crate) fn into_tables(self) -> Tables {
        self.staged
    }

    #[must_use]
    pub fn tables(&self) -> &Tables {
        &self.staged
    }

    #[must_use]
    pub fn get<E: StoredEntity>(&self, id: Id) -> Option<&E> {
        self.staged.table::<E>().get(id)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record of kind `E` has `id`.
    pub fn find<E: StoredEntity>(&self, id: Id) -> Result<E, StoreError> {
        self.get::<E>(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: E::KIND, id })
    }

    /// Records matching `spec`, ordered and windowed.
    #[must_use]
    pub fn select<E: StoredEntity>(&self, spec: &QuerySpec) -> Vec<E> {
        spec.apply(self.staged.table::<E>().entities())
    }

    /// Runs every store-independent and store-dependent rule for `entity`:
    /// its own validations, case-insensitive uniqueness against the other
    /// rows of its table, and existence of every belongs-to reference.
    #[must_use]
    pub fn check<E: StoredEntity>(&self, entity: &E) -> FieldErrors {
        let mut errors = entity.validate();

        for key in entity.unique_keys().into_iter().filter(|k| !k.is_blank()) {
            let taken = self
                .staged
                .table::<E>()
                .entities()
                .filter(|other| other.id() != entity.id())
                .any(|other| other.unique_keys().contains(&key));
            if taken {
                errors.add(key.field, TAKEN);
            }
        }

        for reference in entity.references() {
            let exists = reference
                .id
                .is_some_and(|id| self.staged.contains(reference.kind, id));
            if !exists {
                errors.add(reference.field, MUST_EXIST);
            }
        }

        errors
    }

    /// Inserts a new record (assigning its id) or updates a stored one.
    ///
    /// Does not validate; call [`Transaction::check`] first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when updating a record that no longer
    /// exists, or [`StoreError::Backend`] if no id can be assigned.
    pub fn persist<E: StoredEntity>(&mut self, entity: &mut E) -> Result<(), StoreError> {
        let table = self.staged.table_mut::<E>();
        if entity.is_new() {
            table.insert(entity)?;
            trace!(kind = %E::KIND, id = entity.id(), "inserted");
        } else {
            table.update(entity)?;
            trace!(kind = %E::KIND, id = entity.id(), "updated");
        }
        Ok(())
    }

    /// Removes one record without touching anything that refers to it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record of kind `E` has `id`.
    pub fn delete<E: StoredEntity>(&mut self, id: Id) -> Result<E, StoreError> {
        let removed = self.staged.table_mut::<E>().remove(id)?;
        trace!(kind = %E::KIND, id, "deleted");
        Ok(removed)
    }

    /// Removes every record of kind `E` matching `spec`, returning how many.
    pub fn delete_matching<E: StoredEntity>(&mut self, spec: &QuerySpec) -> usize {
        let ids: Vec<Id> = self.select::<E>(spec).iter().map(Entity::id).collect();
        let table = self.staged.table_mut::<E>();
        ids.into_iter().filter(|id| table.remove(*id).is_ok()).count()
    }

    // ---- product/category join rows ----

    /// Ids of the categories linked to `product_id`, in link order.
    #[must_use]
    pub fn category_ids(&self, product_id: Id) -> Vec<Id> {
        self.select::<ProductCategory>(&links_of("product_id", product_id))
            .into_iter()
            .map(|link| link.category_id)
            .collect()
    }

    /// Makes the product's links exactly `category_ids`: links to categories
    /// not in the set are removed, missing ones are added, and links already
    /// present are left as they are. Duplicate ids are linked once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if a link id cannot be assigned.
    pub fn replace_categories(
        &mut self,
        product_id: Id,
        category_ids: &[Id],
    ) -> Result<(), StoreError> {
        let wanted: BTreeSet<Id> = category_ids.iter().copied().collect();
        let current = self.select::<ProductCategory>(&links_of("product_id", product_id));

        let mut kept = BTreeSet::new();
        for link in current {
            if wanted.contains(&link.category_id) {
                kept.insert(link.category_id);
            } else {
                self.delete::<ProductCategory>(link.id)?;
            }
        }

        for category_id in category_ids {
            if kept.insert(*category_id) {
                self.persist(&mut ProductCategory::link(product_id, *category_id))?;
            }
        }
        Ok(())
    }

    /// Removes the join rows of a product or category (`side` is
    /// `product_id` or `category_id`).
    pub fn unlink(&mut self, side: &str, id: Id) -> usize {
        self.delete_matching::<ProductCategory>(&links_of(side, id))
    }

    // ---- dependants ----

    /// Licenses issued for `game_id`.
    #[must_use]
    pub fn licenses_of(&self, game_id: Id) -> Vec<License> {
        self.select(&QuerySpec::filter(Predicate::Eq {
            field: "game_id".into(),
            value: game_id.into(),
        }))
    }

    /// Games that reference `system_requirement_id`.
    #[must_use]
    pub fn games_requiring(&self, system_requirement_id: Id) -> Vec<Game> {
        self.select(&QuerySpec::filter(Predicate::Eq {
            field: "system_requirement_id".into(),
            value: system_requirement_id.into(),
        }))
    }

    /// Products whose productable child is record `id` of `kind`.
    #[must_use]
    pub fn products_owning(&self, kind: ProductableKind, id: Id) -> Vec<Product> {
        self.select(&QuerySpec {
            predicates: vec![
                Predicate::Eq {
                    field: "productable_type".into(),
                    value: kind.as_str().into(),
                },
                Predicate::Eq {
                    field: "productable_id".into(),
                    value: id.into(),
                },
            ],
            ..QuerySpec::default()
        })
    }
}

fn links_of(side: &str, id: Id) -> QuerySpec {
    QuerySpec::filter(Predicate::Eq {
        field: side.to_string(),
        value: id.into(),
    })
}
