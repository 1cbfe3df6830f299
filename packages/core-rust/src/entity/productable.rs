//! The polymorphic child of a product.
//!
//! The set of child kinds is closed, so it is a plain enum rather than a
//! trait object. Each kind carries the table of attribute names it accepts
//! from a flat product body, resolved once when a save request is built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::game::Game;
use super::Entity;
use crate::types::{Attributes, Id};
use crate::validation::FieldErrors;

/// Tag identifying which child kind a product owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductableKind {
    Game,
}

impl ProductableKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Game => "game",
        }
    }

    /// Attribute names the child of this kind accepts.
    #[must_use]
    pub fn permitted_fields(self) -> &'static [&'static str] {
        match self {
            Self::Game => Game::PERMITTED,
        }
    }
}

impl FromStr for ProductableKind {
    type Err = ();

    /// Accepts `game` and `Game` alike.
    fn from_str(raw: &str) -> Result<Self, ()> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "game" => Ok(Self::Game),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ProductableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product's child record. Serializes keyed by kind: `{"game": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Productable {
    Game(Game),
}

impl Productable {
    /// A fresh, unsaved child of the given kind.
    #[must_use]
    pub fn new(kind: ProductableKind) -> Self {
        match kind {
            ProductableKind::Game => Self::Game(Game::default()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ProductableKind {
        match self {
            Self::Game(_) => ProductableKind::Game,
        }
    }

    #[must_use]
    pub fn id(&self) -> Id {
        match self {
            Self::Game(game) => game.id(),
        }
    }

    pub fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        match self {
            Self::Game(game) => game.assign(attrs),
        }
    }
}
