//! Gamestore Core — entity model, attribute coercion, validation and query options.

pub mod attributes;
pub mod entity;
pub mod query;
pub mod types;
pub mod validation;

pub use attributes::{permit, AttributeReader};
pub use entity::{
    Category, Coupon, CouponStatus, Entity, Game, GameMode, License, LicenseStatus, Platform,
    Product, ProductCategory, ProductStatus, Productable, ProductableKind, Profile, Reference,
    SystemRequirement, UniqueKey, User,
};
pub use query::{Pagination, QueryOptions, QueryResult, SortDirection};
pub use types::{Attributes, EntityKind, Id, Value};
pub use validation::FieldErrors;
