//! Per-kind tables and the typed accessor trait the store is generic over.

use std::collections::BTreeMap;

use gamestore_core::{
    Category, Coupon, Entity, EntityKind, Game, Id, License, Product, ProductCategory,
    SystemRequirement, User,
};

use super::error::StoreError;

/// One table: rows keyed by a monotonically increasing primary key, so
/// iteration order is creation order.
#[derive(Debug, Clone)]
pub struct Table<E> {
    rows: BTreeMap<Id, E>,
    last_id: Id,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E: Entity> Table<E> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Id) -> Option<&E> {
        self.rows.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// Entities in primary key order.
    pub fn entities(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    /// Assigns the next id to `entity` and stores it.
    pub(crate) fn insert(&mut self, entity: &mut E) -> Result<(), StoreError> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("{} id space exhausted", E::KIND))?;
        entity.set_id(id);
        self.rows.insert(id, entity.clone());
        self.last_id = id;
        Ok(())
    }

    pub(crate) fn update(&mut self, entity: &E) -> Result<(), StoreError> {
        let id = entity.id();
        let row = self.rows.get_mut(&id).ok_or(StoreError::NotFound {
            kind: E::KIND,
            id,
        })?;
        *row = entity.clone();
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: Id) -> Result<E, StoreError> {
        self.rows
            .remove(&id)
            .ok_or(StoreError::NotFound { kind: E::KIND, id })
    }
}

/// The full set of tables. Cloned wholesale to stage a transaction.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    categories: Table<Category>,
    products: Table<Product>,
    games: Table<Game>,
    product_categories: Table<ProductCategory>,
    licenses: Table<License>,
    system_requirements: Table<SystemRequirement>,
    coupons: Table<Coupon>,
    users: Table<User>,
}

/// An entity kind that has a table in [`Tables`].
pub trait StoredEntity: Entity {
    fn table(tables: &Tables) -> &Table<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

macro_rules! stored_entity {
    ($($entity:ty => $field:ident),+ $(,)?) => {
        $(
            impl StoredEntity for $entity {
                fn table(tables: &Tables) -> &Table<Self> {
                    &tables.$field
                }

                fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                    &mut tables.$field
                }
            }
        )+
    };
}

stored_entity!(
    Category => categories,
    Product => products,
    Game => games,
    ProductCategory => product_categories,
    License => licenses,
    SystemRequirement => system_requirements,
    Coupon => coupons,
    User => users,
);

impl Tables {
    #[must_use]
    pub fn table<E: StoredEntity>(&self) -> &Table<E> {
        E::table(self)
    }

    pub(crate) fn table_mut<E: StoredEntity>(&mut self) -> &mut Table<E> {
        E::table_mut(self)
    }

    /// Whether a record of `kind` with `id` exists.
    #[must_use]
    pub fn contains(&self, kind: EntityKind, id: Id) -> bool {
        match kind {
            EntityKind::Category => self.categories.contains(id),
            EntityKind::Product => self.products.contains(id),
            EntityKind::Game => self.games.contains(id),
            EntityKind::ProductCategory => self.product_categories.contains(id),
            EntityKind::License => self.licenses.contains(id),
            EntityKind::SystemRequirement => self.system_requirements.contains(id),
            EntityKind::Coupon => self.coupons.contains(id),
            EntityKind::User => self.users.contains(id),
        }
    }

    /// Row count per kind, keyed by the kind's snake_case name.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            (EntityKind::Category.as_str(), self.categories.len()),
            (EntityKind::Product.as_str(), self.products.len()),
            (EntityKind::Game.as_str(), self.games.len()),
            (EntityKind::ProductCategory.as_str(), self.product_categories.len()),
            (EntityKind::License.as_str(), self.licenses.len()),
            (EntityKind::SystemRequirement.as_str(), self.system_requirements.len()),
            (EntityKind::Coupon.as_str(), self.coupons.len()),
            (EntityKind::User.as_str(), self.users.len()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut table = Table::<Category>::default();
        let mut a = Category::named("A");
        let mut b = Category::named("B");
        table.insert(&mut a).unwrap();
        table.insert(&mut b).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        let names: Vec<_> = table.entities().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut table = Table::<Category>::default();
        let mut a = Category::named("A");
        table.insert(&mut a).unwrap();
        table.remove(a.id).unwrap();
        let mut b = Category::named("B");
        table.insert(&mut b).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn update_and_remove_missing_rows_fail() {
        let mut table = Table::<Category>::default();
        let ghost = Category {
            id: 9,
            name: "Ghost".into(),
        };
        assert!(matches!(
            table.update(&ghost),
            Err(StoreError::NotFound { id: 9, .. })
        ));
        assert!(matches!(table.remove(9), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn update_replaces_the_row_in_place() {
        let mut table = Table::<Category>::default();
        let mut cat = Category::named("A");
        table.insert(&mut cat).unwrap();
        cat.name = "B".into();
        table.update(&cat).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(cat.id).unwrap().name, "B");
    }

    #[test]
    fn tables_dispatch_by_kind() {
        let mut tables = Tables::default();
        let mut cat = Category::named("A");
        tables.table_mut::<Category>().insert(&mut cat).unwrap();
        assert!(tables.contains(EntityKind::Category, cat.id));
        assert!(!tables.contains(EntityKind::Product, cat.id));
        assert_eq!(tables.counts()["category"], 1);
    }
}
