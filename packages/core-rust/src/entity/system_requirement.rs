use serde::{Deserialize, Serialize};

use super::{Entity, UniqueKey};
use crate::attributes::AttributeReader;
use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::{presence, FieldErrors};

/// Hardware needed to run a game. Games reference it; it cannot be
/// deleted while any game does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemRequirement {
    pub id: Id,
    pub name: String,
    pub operational_system: String,
    pub storage: String,
    pub processor: String,
    pub memory: String,
    pub video_board: String,
}

impl SystemRequirement {
    fn columns(&self) -> [(&'static str, &str); 6] {
        [
            ("name", &self.name),
            ("operational_system", &self.operational_system),
            ("storage", &self.storage),
            ("processor", &self.processor),
            ("memory", &self.memory),
            ("video_board", &self.video_board),
        ]
    }
}

impl Entity for SystemRequirement {
    const KIND: EntityKind = EntityKind::SystemRequirement;
    const PERMITTED: &'static [&'static str] = &[
        "name",
        "operational_system",
        "storage",
        "processor",
        "memory",
        "video_board",
    ];
    const SEARCHABLE: &'static [&'static str] =
        &["name", "operational_system", "processor", "video_board"];
    const ORDERABLE: &'static [&'static str] = &[
        "id",
        "name",
        "operational_system",
        "storage",
        "processor",
        "memory",
        "video_board",
    ];

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return Some(self.id.into());
        }
        self.columns()
            .into_iter()
            .find(|(column, _)| *column == name)
            .map(|(_, value)| value.into())
    }

    fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        let mut reader = AttributeReader::new(attrs);
        reader.text("name", &mut self.name);
        reader.text("operational_system", &mut self.operational_system);
        reader.text("storage", &mut self.storage);
        reader.text("processor", &mut self.processor);
        reader.text("memory", &mut self.memory);
        reader.text("video_board", &mut self.video_board);
        reader.finish()
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (column, value) in self.columns() {
            presence(&mut errors, column, value);
        }
        errors
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", &self.name)]
    }
}
