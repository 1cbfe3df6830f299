use gamestore_core::{permit, Attributes, Id};
use tracing::info;

use super::error::ServiceError;
use crate::storage::{MemoryStore, StoredEntity, Transaction};

/// Create and update for every kind that has no child of its own.
///
/// Each call is one transaction: permitted attributes are applied, the
/// record is checked against its own rules and the store, and it is written
/// only when no errors were found.
#[derive(Debug, Clone, Copy)]
pub struct RecordSavingService<'a> {
    store: &'a MemoryStore,
}

impl<'a> RecordSavingService<'a> {
    #[must_use]
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Stores a new record built from `initial` plus `attrs`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotSaved`] when the record is invalid and
    /// [`ServiceError::Storage`] on a store failure.
    pub fn create<E: StoredEntity>(&self, initial: E, attrs: &Attributes) -> Result<E, ServiceError> {
        let record = self.store.transaction(|tx| save(tx, initial, attrs))?;
        info!(kind = %E::KIND, id = record.id(), "record created");
        Ok(record)
    }

    /// Applies `attrs` to the stored record `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if there is no such record,
    /// [`ServiceError::NotSaved`] when the result is invalid and
    /// [`ServiceError::Storage`] on a store failure.
    pub fn update<E: StoredEntity>(&self, id: Id, attrs: &Attributes) -> Result<E, ServiceError> {
        let record = self.store.transaction(|tx| {
            let current = tx.find::<E>(id)?;
            save(tx, current, attrs)
        })?;
        info!(kind = %E::KIND, id, "record updated");
        Ok(record)
    }
}

fn save<E: StoredEntity>(
    tx: &mut Transaction,
    mut record: E,
    attrs: &Attributes,
) -> Result<E, ServiceError> {
    let mut errors = record.assign(&permit(attrs, E::PERMITTED));
    errors.merge(tx.check(&record));
    if !errors.is_empty() {
        return Err(errors.into());
    }
    tx.persist(&mut record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use gamestore_core::validation::{MUST_EXIST, TAKEN};
    use gamestore_core::{Category, Coupon, License, User};

    use super::*;

    fn attrs(json: &str) -> Attributes {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn creates_and_updates_a_category() {
        let store = MemoryStore::new();
        let service = RecordSavingService::new(&store);
        let created = service
            .create(Category::default(), &attrs(r#"{"name": "Action"}"#))
            .unwrap();
        assert_eq!(created.id, 1);

        let updated: Category = service.update(1, &attrs(r#"{"name": "Racing"}"#)).unwrap();
        assert_eq!(updated.name, "Racing");
        assert_eq!(store.find::<Category>(1).unwrap().name, "Racing");
    }

    #[test]
    fn invalid_record_is_not_stored() {
        let store = MemoryStore::new();
        let service = RecordSavingService::new(&store);
        service.create(Category::default(), &attrs(r#"{"name": "Action"}"#)).unwrap();

        let err = service
            .create(Category::default(), &attrs(r#"{"name": "action"}"#))
            .unwrap_err();
        let ServiceError::NotSaved { errors } = err else {
            panic!("expected NotSaved");
        };
        assert_eq!(errors.get("name"), Some(&[TAKEN.to_string()][..]));
        assert_eq!(store.counts()["category"], 1);
    }

    #[test]
    fn unpermitted_attributes_are_dropped() {
        let store = MemoryStore::new();
        let service = RecordSavingService::new(&store);
        let user: User = service
            .create(
                User::default(),
                &attrs(
                    r#"{"name": "Ann", "email": "ann@example.com", "password": "secret1",
                        "password_confirmation": "secret1", "password_digest": "forged", "id": 40}"#,
                ),
            )
            .unwrap();
        assert_eq!(user.id, 1);
        assert_ne!(user.password_digest, "forged");
        assert!(user.password_digest.starts_with("$argon2"));
    }

    #[test]
    fn failed_update_leaves_record_as_it_was() {
        let store = MemoryStore::new();
        let service = RecordSavingService::new(&store);
        let due = (Utc::now() + Duration::days(30)).to_rfc3339();
        let body = format!(
            r#"{{"name": "Promo", "code": "PROMO", "status": "active",
                "discount_value": 10, "max_use": 5, "due_date": "{due}"}}"#
        );
        let coupon = service.create(Coupon::default(), &attrs(&body)).unwrap();

        let err = service
            .update::<Coupon>(coupon.id, &attrs(r#"{"code": "NEW", "due_date": "2001-01-01"}"#))
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotSaved { .. }));
        assert_eq!(store.find::<Coupon>(coupon.id).unwrap().code, "PROMO");
    }

    #[test]
    fn missing_record_is_not_found() {
        let store = MemoryStore::new();
        let err = RecordSavingService::new(&store)
            .update::<Category>(3, &Attributes::new())
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { id: 3, .. }));
    }

    #[test]
    fn license_needs_an_existing_game() {
        let store = MemoryStore::new();
        let err = RecordSavingService::new(&store)
            .create(
                License::for_game(5),
                &attrs(r#"{"key": "K-1", "platform": "steam", "status": "available"}"#),
            )
            .unwrap_err();
        let ServiceError::NotSaved { errors } = err else {
            panic!("expected NotSaved");
        };
        assert_eq!(errors.get("game"), Some(&[MUST_EXIST.to_string()][..]));
    }
}
