use serde::{Deserialize, Serialize};

use super::{Entity, UniqueKey};
use crate::attributes::AttributeReader;
use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::{presence, FieldErrors};

/// A tag shared by many products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Id,
    pub name: String,
}

impl Category {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
        }
    }
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;
    const PERMITTED: &'static [&'static str] = &["name"];
    const SEARCHABLE: &'static [&'static str] = &["name"];
    const ORDERABLE: &'static [&'static str] = &["id", "name"];

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
            _ => None,
        }
    }

    fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        let mut reader = AttributeReader::new(attrs);
        reader.text("name", &mut self.name);
        reader.finish()
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        presence(&mut errors, "name", &self.name);
        errors
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", &self.name)]
    }
}
