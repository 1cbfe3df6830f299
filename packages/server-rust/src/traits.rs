use gamestore_core::Entity;

use crate::storage::{QuerySpec, StoreError};

/// Evaluates a [`QuerySpec`] against some backing set of records.
///
/// [`Collection`](crate::storage::Collection) holds one of these behind an
/// `Arc` and only calls into it when a view is materialized or counted.
pub trait CollectionSource<E>: Send + Sync {
    /// Records matching `spec`, ordered and windowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing records cannot be read.
    fn fetch(&self, spec: &QuerySpec) -> Result<Vec<E>, StoreError>;

    /// Number of records matching the predicates of `spec`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing records cannot be read.
    fn count(&self, spec: &QuerySpec) -> Result<u64, StoreError>;
}

/// A fixed list of records in primary key order.
#[derive(Debug, Clone, Default)]
pub struct VecSource<E> {
    rows: Vec<E>,
}

impl<E> VecSource<E> {
    #[must_use]
    pub fn new(rows: Vec<E>) -> Self {
        Self { rows }
    }
}

impl<E: Entity> CollectionSource<E> for VecSource<E> {
    fn fetch(&self, spec: &QuerySpec) -> Result<Vec<E>, StoreError> {
        Ok(spec.apply(&self.rows))
    }

    fn count(&self, spec: &QuerySpec) -> Result<u64, StoreError> {
        Ok(spec.count(&self.rows))
    }
}
