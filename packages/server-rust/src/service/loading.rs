//! The query shaper behind every listing endpoint.

use gamestore_core::{Entity, Pagination, QueryOptions, QueryResult};
use tracing::debug;

use super::error::ServiceError;
use crate::storage::Collection;

/// Shapes one collection into a page of records plus pagination metadata.
///
/// Search and order pairs naming a field the entity does not declare are
/// skipped, so a listing never fails because of its query string. The base
/// collection is consumed by value; callers keep their own clone untouched.
#[derive(Debug, Clone)]
pub struct ModelLoadingService<E> {
    collection: Collection<E>,
    options: QueryOptions,
}

impl<E: Entity> ModelLoadingService<E> {
    #[must_use]
    pub fn new(collection: Collection<E>, options: QueryOptions) -> Self {
        Self {
            collection,
            options,
        }
    }

    /// Loads the requested page.
    ///
    /// `total` counts the searched collection before ordering and
    /// pagination are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Storage`] if the underlying records cannot be
    /// read. Malformed options never produce an error.
    pub fn call(self) -> Result<QueryResult<E>, ServiceError> {
        let Self {
            mut collection,
            options,
        } = self;

        for (field, value) in &options.search {
            if E::SEARCHABLE.contains(&field.as_str()) {
                collection = collection.like(field, value);
            } else {
                debug!(kind = %E::KIND, field = %field, "ignoring unsearchable field");
            }
        }
        let total = collection.count()?;

        for (field, direction) in &options.order {
            if E::ORDERABLE.contains(&field.as_str()) {
                collection = collection.order_by(field, *direction);
            } else {
                debug!(kind = %E::KIND, field = %field, "ignoring unorderable field");
            }
        }

        let records = collection
            .offset(options.offset())
            .limit(u64::from(options.length))
            .load()?;

        Ok(QueryResult {
            records,
            pagination: Pagination::new(options.page, options.length, total),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gamestore_core::{Category, SortDirection, SystemRequirement};
    use proptest::prelude::*;

    use super::*;
    use crate::storage::{QuerySpec, StoreError};
    use crate::traits::{CollectionSource, VecSource};

    fn requirements(names: &[String]) -> Collection<SystemRequirement> {
        let rows = names
            .iter()
            .zip(1..)
            .map(|(name, id)| SystemRequirement {
                id,
                name: name.clone(),
                ..SystemRequirement::default()
            })
            .collect();
        Collection::new(Arc::new(VecSource::new(rows)))
    }

    fn categories(count: usize) -> Collection<Category> {
        let rows = (1..=count)
            .map(|n| Category {
                id: i64::try_from(n).unwrap(),
                name: format!("Category {n}"),
            })
            .collect();
        Collection::new(Arc::new(VecSource::new(rows)))
    }

    #[test]
    fn search_order_and_page_together() {
        let mut names: Vec<String> = (1..=15).map(|n| format!("Search {n}")).collect();
        names.extend((1..=15).map(|n| format!("Other {n}")));
        let options = QueryOptions::default()
            .with_search("name", "Search")
            .with_order("name", SortDirection::Desc)
            .with_page(2, 4);

        let result = ModelLoadingService::new(requirements(&names), options)
            .call()
            .unwrap();

        let found: Vec<_> = result.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(found, ["Search 11", "Search 10", "Search 9", "Search 8"]);
        assert_eq!(
            result.pagination,
            Pagination {
                page: 2,
                length: 4,
                total: 15,
                total_pages: 4
            }
        );
    }

    #[test]
    fn default_options_return_first_ten_in_key_order() {
        let result = ModelLoadingService::new(categories(15), QueryOptions::default())
            .call()
            .unwrap();
        assert_eq!(result.records.len(), 10);
        assert_eq!(result.records[0].id, 1);
        assert_eq!(
            result.pagination,
            Pagination {
                page: 1,
                length: 10,
                total: 15,
                total_pages: 2
            }
        );
    }

    #[test]
    fn undeclared_fields_are_ignored() {
        let options = QueryOptions::default()
            .with_search("password_digest", "x")
            .with_order("nonexistent", SortDirection::Desc);
        let result = ModelLoadingService::new(categories(3), options).call().unwrap();
        let ids: Vec<_> = result.records.iter().map(|c| c.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(result.pagination.total, 3);
    }

    #[test]
    fn declared_non_name_fields_are_searchable() {
        let rows = vec![
            SystemRequirement {
                id: 1,
                name: "Basic".into(),
                video_board: "GeForce GTX 1060".into(),
                ..SystemRequirement::default()
            },
            SystemRequirement {
                id: 2,
                name: "Ultra".into(),
                video_board: "Radeon RX 7900".into(),
                ..SystemRequirement::default()
            },
        ];
        let collection = Collection::new(Arc::new(VecSource::new(rows)));
        let options = QueryOptions::default().with_search("video_board", "geforce");
        let result = ModelLoadingService::new(collection, options).call().unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].name, "Basic");
    }

    #[test]
    fn page_past_the_end_is_empty_but_counts() {
        let options = QueryOptions::default().with_page(5, 10);
        let result = ModelLoadingService::new(categories(12), options).call().unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.pagination.total, 12);
        assert_eq!(result.pagination.total_pages, 2);
    }

    #[test]
    fn base_collection_is_not_modified() {
        let base = categories(5);
        let options = QueryOptions::default().with_search("name", "1");
        let _ = ModelLoadingService::new(base.clone(), options).call().unwrap();
        assert!(base.spec().predicates.is_empty());
        assert_eq!(base.count().unwrap(), 5);
    }

    struct Unreachable;

    impl CollectionSource<Category> for Unreachable {
        fn fetch(&self, _spec: &QuerySpec) -> Result<Vec<Category>, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }

        fn count(&self, _spec: &QuerySpec) -> Result<u64, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
    }

    #[test]
    fn storage_failure_propagates() {
        let collection: Collection<Category> = Collection::new(Arc::new(Unreachable));
        let err = ModelLoadingService::new(collection, QueryOptions::default())
            .call()
            .unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    proptest! {
        #[test]
        fn search_narrows_and_pages_are_bounded(
            count in 0usize..60,
            needle in "[0-9]{0,2}",
            page in 1u32..8,
            length in 1u32..15,
        ) {
            let options = QueryOptions::default()
                .with_search("name", &needle)
                .with_page(page, length);
            let result = ModelLoadingService::new(categories(count), options).call().unwrap();
            let total = result.pagination.total;
            prop_assert!(result.records.len() as u64 <= total);
            prop_assert!(total <= count as u64);
            prop_assert!(result.records.len() <= length as usize);
            prop_assert_eq!(result.pagination.total_pages, total.div_ceil(u64::from(length)));
        }

        #[test]
        fn empty_order_keeps_the_same_records(count in 0usize..30) {
            let plain = ModelLoadingService::new(categories(count), QueryOptions::default())
                .call()
                .unwrap();
            let mut options = QueryOptions::default();
            options.order.clear();
            let ordered = ModelLoadingService::new(categories(count), options).call().unwrap();
            prop_assert_eq!(plain, ordered);
        }
    }
}
