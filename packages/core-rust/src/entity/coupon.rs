use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{date_value, string_enum, Entity, UniqueKey};
use crate::attributes::AttributeReader;
use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::{
    future_date, greater_than, greater_than_or_equal_to, presence, presence_of, FieldErrors,
};

string_enum!(
    CouponStatus {
        Active => "active",
        Inactive => "inactive",
    }
);

/// A discount code. Its due date must lie in the future whenever it is saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Id,
    pub name: String,
    pub code: String,
    pub status: Option<CouponStatus>,
    pub discount_value: Option<f64>,
    pub max_use: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Validation against an explicit clock.
    #[must_use]
    pub fn validate_at(&self, now: DateTime<Utc>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        presence(&mut errors, "name", &self.name);
        presence(&mut errors, "code", &self.code);
        presence_of(&mut errors, "status", self.status.as_ref());
        presence_of(&mut errors, "discount_value", self.discount_value.as_ref());
        greater_than(&mut errors, "discount_value", self.discount_value, 0.0);
        presence_of(&mut errors, "max_use", self.max_use.as_ref());
        greater_than_or_equal_to(&mut errors, "max_use", self.max_use, 0);
        presence_of(&mut errors, "due_date", self.due_date.as_ref());
        future_date(&mut errors, "due_date", self.due_date.as_ref(), now);
        errors
    }
}

impl Entity for Coupon {
    const KIND: EntityKind = EntityKind::Coupon;
    const PERMITTED: &'static [&'static str] =
        &["name", "code", "status", "discount_value", "max_use", "due_date"];
    const SEARCHABLE: &'static [&'static str] = &["name"];
    const ORDERABLE: &'static [&'static str] =
        &["id", "name", "code", "status", "discount_value", "max_use", "due_date"];

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
            "code" => Some(self.code.as_str().into()),
            "status" => Some(self.status.into()),
            "discount_value" => Some(self.discount_value.into()),
            "max_use" => Some(self.max_use.into()),
            "due_date" => Some(date_value(self.due_date.as_ref())),
            _ => None,
        }
    }

    fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        let mut reader = AttributeReader::new(attrs);
        reader.text("name", &mut self.name);
        reader.text("code", &mut self.code);
        reader.choice("status", &mut self.status);
        reader.number("discount_value", &mut self.discount_value);
        reader.integer("max_use", &mut self.max_use);
        reader.datetime("due_date", &mut self.due_date);
        reader.finish()
    }

    fn validate(&self) -> FieldErrors {
        self.validate_at(Utc::now())
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("code", &self.code)]
    }
}
