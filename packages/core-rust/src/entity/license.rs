use serde::{Deserialize, Serialize};

use super::{string_enum, Entity, Reference, UniqueKey};
use crate::attributes::AttributeReader;
use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::{presence, presence_of, FieldErrors};

string_enum!(
    /// Store front a license key redeems on.
    Platform {
        Steam => "steam",
        BattleNet => "battle_net",
        Origin => "origin",
    }
);

string_enum!(
    LicenseStatus {
        Available => "available",
        InUse => "in_use",
        Inactive => "inactive",
    }
);

/// An access key for one game on one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: Id,
    pub key: String,
    pub platform: Option<Platform>,
    pub status: Option<LicenseStatus>,
    pub game_id: Option<Id>,
}

impl License {
    #[must_use]
    pub fn for_game(game_id: Id) -> Self {
        Self {
            game_id: Some(game_id),
            ..Self::default()
        }
    }
}

impl Entity for License {
    const KIND: EntityKind = EntityKind::License;
    const PERMITTED: &'static [&'static str] = &["key", "platform", "status"];
    const SEARCHABLE: &'static [&'static str] = &["key"];
    const ORDERABLE: &'static [&'static str] = &["id", "key", "platform", "status"];

    fn id(&self) -> Id {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "key" => Some(self.key.as_str().into()),
            "platform" => Some(self.platform.into()),
            "status" => Some(self.status.into()),
            "game_id" => Some(self.game_id.into()),
            _ => None,
        }
    }

    fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        let mut reader = AttributeReader::new(attrs);
        reader.text("key", &mut self.key);
        reader.choice("platform", &mut self.platform);
        reader.choice("status", &mut self.status);
        reader.finish()
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        presence(&mut errors, "key", &self.key);
        presence_of(&mut errors, "platform", self.platform.as_ref());
        presence_of(&mut errors, "status", self.status.as_ref());
        errors
    }

    /// Keys are unique per platform, ignoring case.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("key", &self.key).scoped("platform", self.platform)]
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference {
            field: "game",
            kind: EntityKind::Game,
            id: self.game_id,
        }]
    }
}
