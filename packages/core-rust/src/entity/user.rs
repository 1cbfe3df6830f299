use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};

use super::{string_enum, Entity, UniqueKey};
use crate::attributes::AttributeReader;
use crate::types::{Attributes, EntityKind, Id, Value};
use crate::validation::{min_length, presence, FieldErrors, BLANK, INVALID};

/// Shortest password accepted on create or change.
pub const MIN_PASSWORD_LENGTH: usize = 6;

string_enum!(
    Profile {
        Admin => "admin",
        Client => "client",
    }
);

impl Default for Profile {
    fn default() -> Self {
        Self::Client
    }
}

/// An account. Only a salted Argon2id hash of the password is kept, as a PHC
/// string; the plain password and its confirmation live on the value until it
/// is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub profile: Profile,
    #[serde(skip_serializing, default)]
    pub password_digest: String,
    #[serde(skip)]
    pub password: Option<String>,
    #[serde(skip)]
    pub password_confirmation: Option<String>,
}

impl User {
    /// Sets a new password, hashing it under a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns the hasher's error if the password cannot be hashed; the
    /// stored hash is left unchanged.
    pub fn set_password(&mut self, password: &str) -> Result<(), argon2::password_hash::Error> {
        self.password_digest = hash_password(password)?;
        self.password = Some(password.to_string());
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const PERMITTED: &'static [&'static str] =
        &["name", "email", "password", "password_confirmation", "profile"];
    const SEARCHABLE: &'static [&'static str] = &["name"];
    const ORDERABLE: &'static [&'static str] = &["id", "name", "email", "profile"];

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
            "email" => Some(self.email.as_str().into()),
            "profile" => Some(self.profile.into()),
            _ => None,
        }
    }

    /// The transient password pair only ever reflects the latest bag.
    fn assign(&mut self, attrs: &Attributes) -> FieldErrors {
        self.password = None;
        self.password_confirmation = None;
        let mut reader = AttributeReader::new(attrs);
        reader.text("name", &mut self.name);
        reader.text("email", &mut self.email);
        let mut profile = Some(self.profile);
        reader.choice("profile", &mut profile);
        let mut password = None;
        reader.optional_text("password", &mut password);
        reader.optional_text("password_confirmation", &mut self.password_confirmation);
        let mut errors = reader.finish();

        match profile {
            Some(profile) => self.profile = profile,
            None if !errors.contains_key("profile") => errors.add("profile", BLANK),
            None => {}
        }
        if let Some(password) = password {
            if self.set_password(&password).is_err() {
                errors.add("password", INVALID);
            }
        }
        errors
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        presence(&mut errors, "name", &self.name);
        presence(&mut errors, "email", &self.email);
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            errors.add("email", INVALID);
        }
        if self.password_digest.is_empty() {
            errors.add("password", BLANK);
        }
        if let Some(password) = &self.password {
            min_length(&mut errors, "password", password, MIN_PASSWORD_LENGTH);
            if self
                .password_confirmation
                .as_ref()
                .is_some_and(|confirmation| confirmation != password)
            {
                errors.add("password_confirmation", "doesn't match Password");
            }
        }
        errors
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("email", &self.email)]
    }
}
