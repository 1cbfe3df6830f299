use serde::{Deserialize, Serialize};

use super::productable::ProductableKind;
use super::{string_enum, Entity, Reference, UniqueKey};
use crate::attributes::AttributeReader;
use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::{greater_than, presence, presence_of, FieldErrors, MUST_EXIST};

string_enum!(
    /// Sale status of a product.
    ProductStatus {
        Available => "available",
        Unavailable => "unavailable",
    }
);

/// The sellable item. Owns exactly one productable child (tagged by
/// `productable_type`) and many categories through [`ProductCategory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub featured: bool,
    #[serde(rename = "productable")]
    pub productable_type: Option<ProductableKind>,
    pub productable_id: Option<Id>,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            price: None,
            image_url: None,
            status: ProductStatus::Available,
            featured: false,
            productable_type: None,
            productable_id: None,
        }
    }
}

impl Product {
    /// Points the product at its child record.
    pub fn attach(&mut self, kind: ProductableKind, id: Id) {
        self.productable_type = Some(kind);
        self.productable_id = Some(id);
    }
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;
    /// Attributes a client may set on the product itself.
    const PERMITTED: &'static [&'static str] =
        &["name", "description", "price", "image_url", "status", "featured"];
    const SEARCHABLE: &'static [&'static str] = &["name"];
    const ORDERABLE: &'static [&'static str] =
        &["id", "name", "description", "price", "status", "featured"];

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "description" => Some(self.description.as_str().into()),
            "price" => Some(self.price.into()),
            "image_url" => Some(self.image_url.clone().into()),
            "status" => Some(self.status.into()),
            "featured" => Some(self.featured.into()),
            "productable_type" => Some(self.productable_type.map(ProductableKind::as_str).into()),
            "productable_id" => Some(self.productable_id.into()),
            _ => None,
        }
    }

    fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        let mut reader = AttributeReader::new(attrs);
        let mut status = Some(self.status);
        reader.text("name", &mut self.name);
        reader.text("description", &mut self.description);
        reader.number("price", &mut self.price);
        reader.optional_text("image_url", &mut self.image_url);
        reader.choice("status", &mut status);
        reader.boolean("featured", &mut self.featured);
        self.status = status.unwrap_or(ProductStatus::Available);
        reader.finish()
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        presence(&mut errors, "name", &self.name);
        presence(&mut errors, "description", &self.description);
        presence_of(&mut errors, "price", self.price.as_ref());
        greater_than(&mut errors, "price", self.price, 0.0);
        if self.productable_type.is_none() {
            errors.add("productable", MUST_EXIST);
        }
        errors
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", &self.name)]
    }
}

/// Join row between a product and a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: Id,
    pub product_id: Id,
    pub category_id: Id,
}

impl ProductCategory {
    #[must_use]
    pub fn link(product_id: Id, category_id: Id) -> Self {
        Self {
            id: 0,
            product_id,
            category_id,
        }
    }
}

impl Entity for ProductCategory {
    const KIND: EntityKind = EntityKind::ProductCategory;
    const PERMITTED: &'static [&'static str] = &[];
    const SEARCHABLE: &'static [&'static str] = &[];
    const ORDERABLE: &'static [&'static str] = &["id"];

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "product_id" => Some(self.product_id.into()),
            "category_id" => Some(self.category_id.into()),
            _ => None,
        }
    }

    fn assign(&mut self, _attrs: &Attributes) -> FieldErrors {
        FieldErrors::new()
    }

    fn validate(&self) -> FieldErrors {
        FieldErrors::new()
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference {
                field: "product",
                kind: EntityKind::Product,
                id: Some(self.product_id),
            },
            Reference {
                field: "category",
                kind: EntityKind::Category,
                id: Some(self.category_id),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(json: &str) -> Attributes {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn new_product_requires_core_fields_and_productable() {
        let errors = Product::default().validate();
        for field in ["name", "description", "price", "productable"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn price_must_be_positive() {
        let mut product = Product::default();
        let coercion = product.assign(&attrs(r#"{"price": "0"}"#));
        assert!(coercion.is_empty());
        let errors = product.validate();
        assert_eq!(errors.get("price"), Some(&["must be greater than 0".to_string()][..]));
    }

    #[test]
    fn assign_sets_only_supplied_fields() {
        let mut product = Product {
            name: "Old".into(),
            description: "Kept".into(),
            price: Some(10.0),
            ..Product::default()
        };
        let errors = product.assign(&attrs(r#"{"name": "New", "featured": "true"}"#));
        assert!(errors.is_empty());
        assert_eq!(product.name, "New");
        assert_eq!(product.description, "Kept");
        assert!(product.featured);
    }

    #[test]
    fn serializes_productable_tag() {
        let mut product = Product::default();
        product.attach(ProductableKind::Game, 3);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["productable"], "game");
        assert_eq!(json["productable_id"], 3);
    }

    #[test]
    fn join_row_references_both_sides() {
        let refs = ProductCategory::link(1, 2).references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].kind, EntityKind::Category);
    }
}
