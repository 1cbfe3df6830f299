//! Lazily evaluated, chainable views over one table.
//!
//! A [`Collection`] is only a description of a query: predicates, a
//! compound sort key and an offset/limit window. Each builder method returns
//! a new view; nothing is read until [`Collection::load`] or
//! [`Collection::count`] hands the description to its [`CollectionSource`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use gamestore_core::{Entity, SortDirection, Value};

use super::error::StoreError;
use crate::traits::CollectionSource;

/// A filter over entity fields. Unknown field names read as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring match (`field ILIKE '%value%'`).
    Like { field: String, value: String },
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    /// `field >= value`; `Null` fields never match.
    Gte { field: String, value: Value },
}

impl Predicate {
    #[must_use]
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        match self {
            Self::Like { field, value } => read(entity, field).contains_ci(value),
            Self::Eq { field, value } => same(&read(entity, field), value),
            Self::In { field, values } => {
                let actual = read(entity, field);
                values.iter().any(|v| same(&actual, v))
            }
            Self::Gte { field, value } => {
                let actual = read(entity, field);
                actual != Value::Null && actual.sort_cmp(value) != Ordering::Less
            }
        }
    }
}

fn read<E: Entity>(entity: &E, field: &str) -> Value {
    entity.field(field).unwrap_or_default()
}

fn same(a: &Value, b: &Value) -> bool {
    a.sort_cmp(b) == Ordering::Equal
}

/// One component of a compound sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// The full description of a collection query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub predicates: Vec<Predicate>,
    pub order: Vec<OrderBy>,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl QuerySpec {
    #[must_use]
    pub fn filter(predicate: Predicate) -> Self {
        Self {
            predicates: vec![predicate],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        self.predicates.iter().all(|p| p.matches(entity))
    }

    /// Filters, sorts and slices `rows`, which must arrive in primary key
    /// order. The sort is stable, so ties keep primary key order.
    pub fn apply<'a, E, I>(&self, rows: I) -> Vec<E>
    where
        E: Entity,
        I: IntoIterator<Item = &'a E>,
    {
        let mut matched: Vec<&E> = rows.into_iter().filter(|e| self.matches(*e)).collect();
        if !self.order.is_empty() {
            matched.sort_by(|a, b| self.compare(*a, *b));
        }
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = self
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        matched.into_iter().skip(skip).take(take).cloned().collect()
    }

    /// Number of rows matching the predicates. Order and window are ignored.
    pub fn count<'a, E, I>(&self, rows: I) -> u64
    where
        E: Entity,
        I: IntoIterator<Item = &'a E>,
    {
        let n = rows.into_iter().filter(|e| self.matches(*e)).count();
        u64::try_from(n).unwrap_or(u64::MAX)
    }

    fn compare<E: Entity>(&self, a: &E, b: &E) -> Ordering {
        self.order
            .iter()
            .map(|key| {
                let ord = read(a, &key.field).sort_cmp(&read(b, &key.field));
                match key.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// A chainable, lazily evaluated view over records of one kind.
pub struct Collection<E> {
    source: Arc<dyn CollectionSource<E>>,
    spec: QuerySpec,
}

impl<E> Clone for Collection<E> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            spec: self.spec.clone(),
        }
    }
}

impl<E> fmt::Debug for Collection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("spec", &self.spec).finish_non_exhaustive()
    }
}

impl<E: Entity> Collection<E> {
    /// A view over every record `source` holds.
    #[must_use]
    pub fn new(source: Arc<dyn CollectionSource<E>>) -> Self {
        Self {
            source,
            spec: QuerySpec::default(),
        }
    }

    #[must_use]
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.spec.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn like(self, field: &str, value: &str) -> Self {
        self.filter(Predicate::Like {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    #[must_use]
    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Predicate::Eq {
            field: field.to_string(),
            value: value.into(),
        })
    }

    #[must_use]
    pub fn where_in<V: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.filter(Predicate::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    #[must_use]
    pub fn where_gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(Predicate::Gte {
            field: field.to_string(),
            value: value.into(),
        })
    }

    /// Appends a sort key after any existing ones.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.spec.order.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.spec.offset = offset;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    /// Materializes the view.
    ///
    /// # Errors
    ///
    /// Returns the source's error if it cannot be read.
    pub fn load(&self) -> Result<Vec<E>, StoreError> {
        self.source.fetch(&self.spec)
    }

    /// Counts matching records, ignoring order, offset and limit.
    ///
    /// # Errors
    ///
    /// Returns the source's error if it cannot be read.
    pub fn count(&self) -> Result<u64, StoreError> {
        self.source.count(&self.spec)
    }
}
