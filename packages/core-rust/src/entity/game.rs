use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{date_value, string_enum, Entity, Reference};
use crate::attributes::AttributeReader;
use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::{presence, presence_of, FieldErrors};

string_enum!(
    /// Multiplayer mode of a game.
    GameMode {
        Pvp => "pvp",
        Pve => "pve",
        Both => "both",
    }
);

/// Game details attached to a product as its productable child.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Id,
    pub mode: Option<GameMode>,
    pub release_date: Option<DateTime<Utc>>,
    pub developer: String,
    pub system_requirement_id: Option<Id>,
}

impl Entity for Game {
    const KIND: EntityKind = EntityKind::Game;
    /// Attributes a client may set on a game through its product.
    const PERMITTED: &'static [&'static str] =
        &["mode", "release_date", "developer", "system_requirement_id"];
    const SEARCHABLE: &'static [&'static str] = &["developer"];
    const ORDERABLE: &'static [&'static str] = &["id", "mode", "release_date", "developer"];

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "mode" => Some(self.mode.into()),
            "release_date" => Some(date_value(self.release_date.as_ref())),
            "developer" => Some(self.developer.as_str().into()),
            "system_requirement_id" => Some(self.system_requirement_id.into()),
            _ => None,
        }
    }

    fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        let mut reader = AttributeReader::new(attrs);
        reader.choice("mode", &mut self.mode);
        reader.datetime("release_date", &mut self.release_date);
        reader.text("developer", &mut self.developer);
        reader.id("system_requirement_id", &mut self.system_requirement_id);
        reader.finish()
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        presence_of(&mut errors, "mode", self.mode.as_ref());
        presence_of(&mut errors, "release_date", self.release_date.as_ref());
        presence(&mut errors, "developer", &self.developer);
        errors
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference {
            field: "system_requirement",
            kind: EntityKind::SystemRequirement,
            id: self.system_requirement_id,
        }]
    }
}
