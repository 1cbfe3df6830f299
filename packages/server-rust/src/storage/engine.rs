//! In-memory relational store with all-or-nothing transactions.
//!
//! Readers take the shared lock and only ever see committed tables. A
//! writer takes the exclusive lock, stages a full copy of the tables, runs
//! its closure against the copy, and swaps the copy in only if the closure
//! returns `Ok`. An `Err` drops the copy, so nothing it wrote is visible.

use std::collections::BTreeMap;
use std::sync::Arc;

use gamestore_core::Id;
use parking_lot::RwLock;
use tracing::debug;

use super::collection::{Collection, QuerySpec};
use super::error::StoreError;
use super::tables::{StoredEntity, Tables};
use super::transaction::Transaction;
use crate::traits::CollectionSource;

/// Shared entity store. Wrap in `Arc` to hand out collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the committed tables under the shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&self.tables.read())
    }

    /// Loads one committed record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record of kind `E` has `id`.
    pub fn find<E: StoredEntity>(&self, id: Id) -> Result<E, StoreError> {
        self.read(|tables| {
            tables
                .table::<E>()
                .get(id)
                .cloned()
                .ok_or(StoreError::NotFound { kind: E::KIND, id })
        })
    }

    /// A lazy view over every committed record of kind `E`.
    #[must_use]
    pub fn collection<E: StoredEntity>(self: &Arc<Self>) -> Collection<E> {
        Collection::new(Arc::clone(self) as Arc<dyn CollectionSource<E>>)
    }

    /// Row count per kind.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        self.read(Tables::counts)
    }

    /// Runs `f` inside one atomic unit.
    ///
    /// Every write `f` performs lands in a staged copy of the tables. The
    /// copy replaces the committed tables when `f` returns `Ok`; on `Err`
    /// it is discarded and the committed state is exactly as before.
    /// Writers are serialized.
    ///
    /// Staging clones every table under the write lock, so each transaction
    /// costs time and memory linear in the total number of stored records,
    /// and readers wait for the clone. Sized for an in-memory catalogue, not
    /// for bulk data.
    ///
    /// # Errors
    ///
    /// Returns whatever error `f` returns.
    pub fn transaction<T, Err>(
        &self,
        f: impl FnOnce(&mut Transaction) -> Result<T, Err>,
    ) -> Result<T, Err> {
        let mut committed = self.tables.write();
        let mut tx = Transaction::new(committed.clone());
        match f(&mut tx) {
            Ok(value) => {
                *committed = tx.into_tables();
                debug!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                debug!("transaction rolled back");
                Err(err)
            }
        }
    }
}

impl<E: StoredEntity> CollectionSource<E> for MemoryStore {
    fn fetch(&self, spec: &QuerySpec) -> Result<Vec<E>, StoreError> {
        Ok(self.read(|tables| spec.apply(tables.table::<E>().entities())))
    }

    fn count(&self, spec: &QuerySpec) -> Result<u64, StoreError> {
        Ok(self.read(|tables| spec.count(tables.table::<E>().entities())))
    }
}

#[cfg(test)]
mod tests {
    use gamestore_core::{Category, SortDirection};

    use super::*;

    fn seeded(names: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .transaction(|tx| {
                for name in names {
                    tx.persist(&mut Category::named(name))?;
                }
                Ok::<_, StoreError>(())
            })
            .unwrap();
        store
    }

    #[test]
    fn committed_writes_are_visible() {
        let store = seeded(&["Action", "Racing"]);
        assert_eq!(store.counts()["category"], 2);
        assert_eq!(store.find::<Category>(2).unwrap().name, "Racing");
    }

    #[test]
    fn failed_transaction_leaves_no_trace() {
        let store = seeded(&["Action"]);
        let result: Result<(), StoreError> = store.transaction(|tx| {
            tx.persist(&mut Category::named("Racing"))?;
            let mut first = tx.find::<Category>(1)?;
            first.name = "Renamed".into();
            tx.persist(&mut first)?;
            Err(StoreError::Backend(anyhow::anyhow!("boom")))
        });
        assert!(result.is_err());
        assert_eq!(store.counts()["category"], 1);
        assert_eq!(store.find::<Category>(1).unwrap().name, "Action");
    }

    #[test]
    fn find_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.find::<Category>(7),
            Err(StoreError::NotFound { id: 7, .. })
        ));
    }

    #[test]
    fn collection_reads_committed_rows_lazily() {
        let store = seeded(&["b", "a"]);
        let view = store.collection::<Category>().order_by("name", SortDirection::Asc);
        store
            .transaction(|tx| tx.persist(&mut Category::named("c")))
            .unwrap();
        let names: Vec<_> = view.load().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
