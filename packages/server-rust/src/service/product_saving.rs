//! All-or-nothing saving of a product with its child and categories.
//!
//! A save runs as one store transaction:
//!
//! 1. resolve the child kind (requested, else the product's current kind)
//! 2. build or fetch the child and apply its attributes
//! 3. build or fetch the product and apply its attributes
//! 4. resolve the requested category ids, if any were supplied
//! 5. if any step reported errors, roll back and return every error merged
//!    into one field map; otherwise persist child, product and category
//!    links, in that order, and commit

use gamestore_core::validation::{INVALID, NOT_IN_LIST};
use gamestore_core::{
    permit, Attributes, Category, Entity, FieldErrors, Id, Product, Productable, ProductableKind,
    Value,
};
use tracing::{debug, info};

use super::error::ServiceError;
use super::product_view::ProductView;
use super::productable;
use crate::storage::{MemoryStore, Transaction};

/// Body keys that are never child attributes.
const NON_CHILD_KEYS: &[&str] = &["productable", "category_ids"];

/// Everything one create or update of a product may change.
///
/// `category_ids: None` leaves the product's categories alone, while
/// `Some(vec![])` removes all of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSaveRequest {
    /// Product to update; `None` creates one.
    pub product_id: Option<Id>,
    pub attributes: Attributes,
    /// Raw kind tag as the client sent it (`"game"`, `"Game"`).
    pub productable_kind: Option<String>,
    /// Candidate child attributes. Only the keys the resolved kind accepts
    /// are applied.
    pub productable_attributes: Option<Attributes>,
    pub category_ids: Option<Vec<Value>>,
}

impl ProductSaveRequest {
    #[must_use]
    pub fn create(attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn update(product_id: Id, attributes: Attributes) -> Self {
        Self {
            product_id: Some(product_id),
            attributes,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_productable(mut self, kind: &str, attributes: Attributes) -> Self {
        self.productable_kind = Some(kind.to_string());
        self.productable_attributes = Some(attributes);
        self
    }

    #[must_use]
    pub fn with_category_ids(mut self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.category_ids = Some(ids.into_iter().map(Value::from).collect());
        self
    }

    /// Splits one flat product body into product, child and category parts.
    ///
    /// Every key that is not a product field, `productable` or
    /// `category_ids` becomes a candidate child attribute. The kind they
    /// apply to is resolved inside the save transaction, so an update may
    /// omit `productable` and still change the stored child. A `null`
    /// `category_ids` counts as absent.
    #[must_use]
    pub fn from_body(product_id: Option<Id>, body: &Attributes) -> Self {
        let productable_kind = body
            .get("productable")
            .filter(|value| !value.is_blank())
            .map(ToString::to_string);

        let productable_attributes: Attributes = body
            .iter()
            .filter(|(key, _)| {
                !Product::PERMITTED.contains(&key.as_str())
                    && !NON_CHILD_KEYS.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let productable_attributes = Some(productable_attributes).filter(|attrs| !attrs.is_empty());

        let category_ids = match body.get("category_ids") {
            None | Some(Value::Null) => None,
            Some(Value::Array(ids)) => Some(ids.clone()),
            Some(single) => Some(vec![single.clone()]),
        };

        Self {
            product_id,
            attributes: permit(body, Product::PERMITTED),
            productable_kind,
            productable_attributes,
            category_ids,
        }
    }
}

/// Saves one [`ProductSaveRequest`] against a store.
#[derive(Debug)]
pub struct ProductSavingService<'a> {
    store: &'a MemoryStore,
    request: ProductSaveRequest,
}

impl<'a> ProductSavingService<'a> {
    #[must_use]
    pub fn new(store: &'a MemoryStore, request: ProductSaveRequest) -> Self {
        Self { store, request }
    }

    /// Runs the save and returns the stored product with its child and
    /// categories.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotSaved`] with the merged child and product errors
    ///   when anything is invalid; nothing is written.
    /// - [`ServiceError::NotFound`] when updating a product that does not
    ///   exist.
    /// - [`ServiceError::Storage`] on a store failure; nothing is written.
    pub fn call(self) -> Result<ProductView, ServiceError> {
        let Self { store, request } = self;
        let view = store.transaction(|tx| save(tx, &request))?;
        info!(product = view.product.id, "product saved");
        Ok(view)
    }
}

fn save(tx: &mut Transaction, request: &ProductSaveRequest) -> Result<ProductView, ServiceError> {
    let mut product = match request.product_id {
        Some(id) => tx.find::<Product>(id)?,
        None => Product::default(),
    };
    let mut errors = FieldErrors::new();

    let requested = match request.productable_kind.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            let parsed = raw.parse::<ProductableKind>().ok();
            if parsed.is_none() {
                errors.add("productable", NOT_IN_LIST);
            }
            parsed
        }
        _ => None,
    };
    let kind = requested.or(product.productable_type);

    let current = productable::load(tx, &product);
    let (mut child, replaced) = match (kind, current) {
        (Some(kind), Some(current)) if current.kind() == kind => (Some(current), None),
        (Some(kind), current) => (Some(Productable::new(kind)), current),
        (None, _) => (None, None),
    };
    if let Some(child) = child.as_mut() {
        if let Some(attrs) = &request.productable_attributes {
            errors.merge(child.assign(&permit(attrs, child.kind().permitted_fields())));
        }
        errors.merge(productable::check(tx, child));
    }

    errors.merge(product.assign(&permit(&request.attributes, Product::PERMITTED)));
    if let Some(kind) = kind {
        product.productable_type = Some(kind);
    }
    errors.merge(tx.check(&product));

    let category_ids = request
        .category_ids
        .as_deref()
        .map(|raw| resolve_categories(tx, raw, &mut errors));

    if !errors.is_empty() {
        debug!(fields = errors.len(), "product not saved");
        return Err(ServiceError::NotSaved { errors });
    }

    if let Some(child) = child.as_mut() {
        productable::persist(tx, child)?;
        product.attach(child.kind(), child.id());
    }
    tx.persist(&mut product)?;
    if let Some(old) = replaced {
        productable::delete(tx, old.kind(), old.id())?;
    }
    if let Some(ids) = category_ids {
        tx.replace_categories(product.id, &ids)?;
    }

    Ok(ProductView::load(tx.tables(), product))
}

/// Maps requested ids onto stored categories. Blank entries are skipped;
/// anything that is not the id of an existing category makes the whole
/// list invalid.
fn resolve_categories(tx: &Transaction, raw: &[Value], errors: &mut FieldErrors) -> Vec<Id> {
    let mut ids = Vec::with_capacity(raw.len());
    let mut invalid = false;
    for value in raw.iter().filter(|v| !v.is_blank()) {
        match value.as_i64().filter(|id| tx.get::<Category>(*id).is_some()) {
            Some(id) => ids.push(id),
            None => invalid = true,
        }
    }
    if invalid {
        errors.add("category_ids", INVALID);
    }
    ids
}

#[cfg(test)]
mod tests {
    use gamestore_core::validation::{BLANK, MUST_EXIST};
    use gamestore_core::{Game, GameMode, ProductCategory, SystemRequirement};

    use super::*;
    use crate::storage::StoreError;

    fn attrs(json: &str) -> Attributes {
        serde_json::from_str(json).unwrap()
    }

    /// Store with one system requirement (id 1) and categories 1..=4.
    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .transaction(|tx| {
                let mut requirement = SystemRequirement {
                    name: "Basic".into(),
                    operational_system: "Windows 10".into(),
                    storage: "50GB".into(),
                    processor: "i5".into(),
                    memory: "8GB".into(),
                    video_board: "GTX 1060".into(),
                    ..SystemRequirement::default()
                };
                tx.persist(&mut requirement)?;
                for name in ["c1", "c2", "c3", "c4"] {
                    tx.persist(&mut Category::named(name))?;
                }
                Ok::<_, StoreError>(())
            })
            .unwrap();
        store
    }

    fn game_attrs() -> Attributes {
        attrs(
            r#"{"mode": "pvp", "release_date": "2020-11-21 10:34:23",
                "developer": "Studio", "system_requirement_id": 1}"#,
        )
    }

    fn product_attrs(name: &str) -> Attributes {
        attrs(&format!(
            r#"{{"name": "{name}", "description": "Fun", "price": 59.9, "status": "available"}}"#
        ))
    }

    fn create(store: &MemoryStore, name: &str, categories: &[Id]) -> ProductView {
        let request = ProductSaveRequest::create(product_attrs(name))
            .with_productable("game", game_attrs())
            .with_category_ids(categories.iter().copied());
        ProductSavingService::new(store, request).call().unwrap()
    }

    fn not_saved(result: Result<ProductView, ServiceError>) -> FieldErrors {
        match result {
            Err(ServiceError::NotSaved { errors }) => errors,
            other => panic!("expected NotSaved, got {other:?}"),
        }
    }

    fn category_names(view: &ProductView) -> Vec<&str> {
        view.categories.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn creates_product_child_and_links_together() {
        let store = seeded();
        let view = create(&store, "Arena", &[1, 2]);

        assert_eq!(view.product.id, 1);
        assert_eq!(view.product.productable_type, Some(ProductableKind::Game));
        let Some(Productable::Game(game)) = &view.productable else {
            panic!("expected a game child");
        };
        assert_eq!(view.product.productable_id, Some(game.id));
        assert_eq!(game.mode, Some(GameMode::Pvp));
        assert_eq!(category_names(&view), ["c1", "c2"]);
        assert_eq!(store.counts()["game"], 1);
        assert_eq!(store.counts()["product_category"], 2);
    }

    #[test]
    fn invalid_product_writes_nothing() {
        let store = seeded();
        let request = ProductSaveRequest::create(attrs(r#"{"name": ""}"#))
            .with_productable("game", game_attrs())
            .with_category_ids([1]);
        let errors = not_saved(ProductSavingService::new(&store, request).call());

        assert_eq!(errors.get("name"), Some(&[BLANK.to_string()][..]));
        assert_eq!(store.counts()["product"], 0);
        assert_eq!(store.counts()["game"], 0);
        assert_eq!(store.counts()["product_category"], 0);
    }

    #[test]
    fn child_and_product_errors_are_merged() {
        let store = seeded();
        let request = ProductSaveRequest::create(attrs(r#"{"price": -1}"#))
            .with_productable("game", attrs(r#"{"system_requirement_id": 99}"#));
        let errors = not_saved(ProductSavingService::new(&store, request).call());

        for field in ["developer", "mode", "release_date", "name", "price"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
        assert_eq!(errors.get("system_requirement"), Some(&[MUST_EXIST.to_string()][..]));
    }

    #[test]
    fn updating_only_categories_keeps_the_child() {
        let store = seeded();
        let created = create(&store, "Arena", &[1, 2]);

        let request = ProductSaveRequest::update(created.product.id, Attributes::new())
            .with_category_ids([3, 4]);
        let updated = ProductSavingService::new(&store, request).call().unwrap();

        assert_eq!(category_names(&updated), ["c3", "c4"]);
        assert_eq!(updated.productable, created.productable);
        assert_eq!(updated.product.name, "Arena");
        assert_eq!(store.counts()["game"], 1);
    }

    #[test]
    fn failed_update_keeps_product_child_and_links() {
        let store = seeded();
        let created = create(&store, "Arena", &[1, 2]);

        let request = ProductSaveRequest::update(created.product.id, product_attrs("Renamed"))
            .with_productable("game", attrs(r#"{"developer": ""}"#))
            .with_category_ids([3]);
        let errors = not_saved(ProductSavingService::new(&store, request).call());
        assert!(errors.contains_key("developer"));

        let product = store.find::<Product>(created.product.id).unwrap();
        assert_eq!(product, created.product);
        let game = store.find::<Game>(product.productable_id.unwrap()).unwrap();
        assert_eq!(game.developer, "Studio");
        let view = store.read(|tables| ProductView::load(tables, product));
        assert_eq!(category_names(&view), ["c1", "c2"]);
    }

    #[test]
    fn absent_categories_are_untouched_and_empty_clears() {
        let store = seeded();
        let created = create(&store, "Arena", &[1, 2]);

        let request = ProductSaveRequest::update(created.product.id, attrs(r#"{"featured": true}"#));
        let updated = ProductSavingService::new(&store, request).call().unwrap();
        assert!(updated.product.featured);
        assert_eq!(category_names(&updated), ["c1", "c2"]);

        let request = ProductSaveRequest::update(created.product.id, Attributes::new())
            .with_category_ids([]);
        let cleared = ProductSavingService::new(&store, request).call().unwrap();
        assert!(cleared.categories.is_empty());
        assert_eq!(store.counts()["category"], 4);
    }

    #[test]
    fn create_without_kind_reports_productable() {
        let store = seeded();
        let request = ProductSaveRequest::create(product_attrs("Arena"));
        let errors = not_saved(ProductSavingService::new(&store, request).call());
        assert_eq!(errors.get("productable"), Some(&[MUST_EXIST.to_string()][..]));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_kind_is_not_in_list() {
        let store = seeded();
        let request =
            ProductSaveRequest::create(product_attrs("Arena")).with_productable("console", game_attrs());
        let errors = not_saved(ProductSavingService::new(&store, request).call());
        assert!(errors
            .get("productable")
            .unwrap()
            .contains(&NOT_IN_LIST.to_string()));
    }

    #[test]
    fn kind_tag_is_case_insensitive() {
        let store = seeded();
        let request =
            ProductSaveRequest::create(product_attrs("Arena")).with_productable("Game", game_attrs());
        let view = ProductSavingService::new(&store, request).call().unwrap();
        assert_eq!(view.product.productable_type, Some(ProductableKind::Game));
    }

    #[test]
    fn unknown_category_ids_are_invalid() {
        let store = seeded();
        let request = ProductSaveRequest::create(product_attrs("Arena"))
            .with_productable("game", game_attrs())
            .with_category_ids([1, 42]);
        let errors = not_saved(ProductSavingService::new(&store, request).call());
        assert_eq!(errors.get("category_ids"), Some(&[INVALID.to_string()][..]));
        assert_eq!(store.counts()["product"], 0);
    }

    #[test]
    fn duplicate_name_is_taken() {
        let store = seeded();
        create(&store, "Arena", &[]);
        let request = ProductSaveRequest::create(product_attrs("ARENA"))
            .with_productable("game", game_attrs());
        let errors = not_saved(ProductSavingService::new(&store, request).call());
        assert!(errors.contains_key("name"));
        assert_eq!(store.counts()["game"], 1);
    }

    #[test]
    fn missing_product_is_not_found() {
        let store = seeded();
        let request = ProductSaveRequest::update(7, Attributes::new());
        let result = ProductSavingService::new(&store, request).call();
        assert!(matches!(result, Err(ServiceError::NotFound { id: 7, .. })));
    }

    #[test]
    fn body_is_split_into_parts() {
        let body = attrs(
            r#"{"name": "Arena", "price": "10", "productable": "game", "developer": "Studio",
                "mode": "pve", "category_ids": [1, "2"], "admin": true}"#,
        );
        let request = ProductSaveRequest::from_body(None, &body);

        assert_eq!(request.productable_kind.as_deref(), Some("game"));
        let child = request.productable_attributes.unwrap();
        assert_eq!(child.keys().collect::<Vec<_>>(), ["admin", "developer", "mode"]);
        assert_eq!(request.attributes.keys().collect::<Vec<_>>(), ["name", "price"]);
        assert_eq!(request.category_ids.unwrap().len(), 2);
    }

    #[test]
    fn body_without_child_keys_has_no_child_part() {
        let body = attrs(r#"{"name": "Arena", "category_ids": null}"#);
        let request = ProductSaveRequest::from_body(Some(1), &body);
        assert!(request.productable_kind.is_none());
        assert!(request.productable_attributes.is_none());
        assert!(request.category_ids.is_none());
    }

    #[test]
    fn stored_kind_is_resolved_inside_the_save() {
        let store = seeded();
        let created = create(&store, "Arena", &[1]);
        let body = attrs(r#"{"developer": "Other Studio", "unknown": 1}"#);
        let request = ProductSaveRequest::from_body(Some(created.product.id), &body);
        assert!(request.productable_kind.is_none());

        let updated = ProductSavingService::new(&store, request).call().unwrap();
        let Some(Productable::Game(game)) = updated.productable else {
            panic!("expected a game child");
        };
        assert_eq!(game.developer, "Other Studio");
        assert_eq!(updated.product.productable_id, created.product.productable_id);
    }

    #[test]
    fn child_attributes_apply_on_update() {
        let store = seeded();
        let created = create(&store, "Arena", &[1]);
        let body = attrs(r#"{"developer": "New Studio"}"#);
        let request = ProductSaveRequest::from_body(Some(created.product.id), &body);
        let updated = ProductSavingService::new(&store, request).call().unwrap();
        let Some(Productable::Game(game)) = updated.productable else {
            panic!("expected a game child");
        };
        assert_eq!(game.developer, "New Studio");
        assert_eq!(game.mode, Some(GameMode::Pvp));
        assert_eq!(store.counts()["game"], 1);
        assert_eq!(store.read(|t| t.table::<ProductCategory>().len()), 1);
    }
}
