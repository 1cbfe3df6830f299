//! In-memory relational storage for the gamestore server.
//!
//! - [`Tables`] / [`Table`]: one primary-keyed table per entity kind
//! - [`MemoryStore`]: committed state behind a reader/writer lock, with
//!   all-or-nothing [`transaction`](MemoryStore::transaction)s
//! - [`Transaction`]: staged reads and writes, validation against the
//!   store, and the join/dependant helpers the services use
//! - [`Collection`]: lazily evaluated views evaluated by a
//!   [`CollectionSource`](crate::traits::CollectionSource)

pub mod collection;
pub mod engine;
pub mod error;
pub mod tables;
pub mod transaction;

pub use collection::*;
pub use engine::*;
pub use error::*;
pub use tables::*;
pub use transaction::*;
