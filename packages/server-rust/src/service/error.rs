use gamestore_core::{EntityKind, FieldErrors, Id};

use crate::storage::StoreError;

/// Errors returned by the services.
///
/// Validation-shaped failures always arrive as [`ServiceError::NotSaved`]
/// with a field-keyed map; only infrastructure failures use
/// [`ServiceError::Storage`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("record not saved: {} invalid field(s)", errors.len())]
    NotSaved { errors: FieldErrors },
    #[error("{kind} with id {id} not found")]
    NotFound { kind: EntityKind, id: Id },
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    /// Shorthand for a one-message `NotSaved`.
    #[must_use]
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::NotSaved {
            errors: FieldErrors::single(field, message),
        }
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::NotSaved { errors }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::Backend(source) => Self::Storage(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_onto_service_errors() {
        let not_found: ServiceError = StoreError::NotFound {
            kind: EntityKind::Product,
            id: 3,
        }
        .into();
        assert!(matches!(not_found, ServiceError::NotFound { id: 3, .. }));
        assert_eq!(not_found.to_string(), "product with id 3 not found");

        let backend: ServiceError = StoreError::Backend(anyhow::anyhow!("disk")).into();
        assert!(matches!(backend, ServiceError::Storage(_)));
    }

    #[test]
    fn field_errors_become_not_saved() {
        let err: ServiceError = FieldErrors::single("name", "can't be blank").into();
        let ServiceError::NotSaved { errors } = err else {
            panic!("expected NotSaved");
        };
        assert!(errors.contains_key("name"));
    }
}
