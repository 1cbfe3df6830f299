use gamestore_core::{EntityKind, Id};

/// Failures raised by the entity store.
///
/// Validation problems never appear here; they are reported as
/// [`FieldErrors`](gamestore_core::FieldErrors) by the callers that run checks.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: EntityKind, id: Id },
    #[error("storage backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}
