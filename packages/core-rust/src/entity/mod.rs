//! Entity kinds and the trait the store, the query shaper and the savers
//! program against.
//!
//! Each kind declares its search/order allow-lists, exposes its fields as
//! [`Value`]s, applies attribute bags, and validates itself explicitly.
//! Store-dependent rules (uniqueness, belongs-to existence) are declared as
//! data via [`UniqueKey`] and [`Reference`] and enforced by the store inside
//! the writing transaction.

use std::fmt::Debug;

use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::FieldErrors;

pub mod category;
pub mod coupon;
pub mod game;
pub mod license;
pub mod product;
pub mod productable;
pub mod system_requirement;
pub mod user;

pub use category::Category;
pub use coupon::{Coupon, CouponStatus};
pub use game::{Game, GameMode};
pub use license::{License, LicenseStatus, Platform};
pub use product::{Product, ProductCategory, ProductStatus};
pub use productable::{Productable, ProductableKind};
pub use system_requirement::SystemRequirement;
pub use user::{Profile, User};

/// A persisted record kind.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    const KIND: EntityKind;
    /// Attribute names a client may set through the API.
    const PERMITTED: &'static [&'static str];
    /// Fields accepted by `search[field]` (case-insensitive substring match).
    const SEARCHABLE: &'static [&'static str];
    /// Fields accepted by `order[field]`.
    const ORDERABLE: &'static [&'static str];

    /// Primary key; `0` until the record is first stored.
    fn id(&self) -> Id;

    fn set_id(&mut self, id: Id);

    fn is_new(&self) -> bool {
        self.id() == 0
    }

    /// Field value for filtering and ordering, `None` for unknown names.
    fn field(&self, name: &str) -> Option<Value>;

    /// Applies the attributes present in `attrs`, returning coercion errors.
    fn assign(&mut self, attrs: &Attributes) -> FieldErrors;

    /// Store-independent rules (presence, numericality, formats).
    fn validate(&self) -> FieldErrors;

    /// Case-insensitive uniqueness constraints.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    /// Belongs-to foreign keys that must point at an existing record.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// One uniqueness constraint value of a record.
///
/// Two records collide when `field`, the lowercased `value` and every
/// `scope` pair are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueKey {
    pub field: &'static str,
    pub value: String,
    pub scope: Vec<(&'static str, Value)>,
}

impl UniqueKey {
    #[must_use]
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.trim().to_lowercase(),
            scope: Vec::new(),
        }
    }

    #[must_use]
    pub fn scoped(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.scope.push((field, value.into()));
        self
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.value.is_empty()
    }
}

/// A belongs-to association. The error for a dangling or missing id is
/// reported under `field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub kind: EntityKind,
    pub id: Option<Id>,
}

/// Generates a string-backed enum with `as_str`, `FromStr` (case-insensitive)
/// and snake_case serde.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ();

            fn from_str(raw: &str) -> Result<Self, ()> {
                let lowered = raw.trim().to_ascii_lowercase();
                $(
                    if lowered == $text {
                        return Ok($name::$variant);
                    }
                )+
                Err(())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for $crate::types::Value {
            fn from(v: $name) -> Self {
                $crate::types::Value::String(v.as_str().to_string())
            }
        }
    };
}

pub(crate) use string_enum;

/// Epoch-millisecond view of a date, used for ordering.
pub(crate) fn date_value(date: Option<&chrono::DateTime<chrono::Utc>>) -> Value {
    date.map_or(Value::Null, |d| Value::Int(d.timestamp_millis()))
}
