//! Field-keyed validation errors and the explicit rule helpers entities use
//! to build them.
//!
//! Every entity kind validates itself with a plain function returning
//! [`FieldErrors`]; nothing runs implicitly on save. Messages follow the
//! wording API clients already expect (`can't be blank`, `must exist`, ...).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";
pub const MUST_EXIST: &str = "must exist";
pub const NOT_A_NUMBER: &str = "is not a number";
pub const NOT_AN_INTEGER: &str = "must be an integer";
pub const NOT_A_DATE: &str = "is not a valid date";
pub const NOT_IN_LIST: &str = "is not included in the list";
pub const INVALID: &str = "is invalid";

/// Ordered mapping of field name to the messages raised against it.
///
/// Serializes as a plain JSON object: `{"name": ["can't be blank"]}`.
/// Merging accumulates messages, so a field that fails on two records
/// carries both messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a map holding one message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Appends every message of `other`, keeping existing ones.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// Rule helpers
// ---------------------------------------------------------------------------

pub fn presence(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
    }
}

pub fn presence_of<T>(errors: &mut FieldErrors, field: &str, value: Option<&T>) {
    if value.is_none() {
        errors.add(field, BLANK);
    }
}

/// Strictly-greater check. Absent values are left to [`presence_of`].
pub fn greater_than(errors: &mut FieldErrors, field: &str, value: Option<f64>, bound: f64) {
    if let Some(v) = value {
        if v <= bound {
            errors.add(field, format!("must be greater than {bound}"));
        }
    }
}

pub fn greater_than_or_equal_to(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<i64>,
    bound: i64,
) {
    if let Some(v) = value {
        if v < bound {
            errors.add(field, format!("must be greater than or equal to {bound}"));
        }
    }
}

/// The date must be strictly after `now`; the current instant is rejected.
pub fn future_date(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&DateTime<Utc>>,
    now: DateTime<Utc>,
) {
    if let Some(date) = value {
        if *date <= now {
            errors.add(field, "must be a future date");
        }
    }
}

pub fn min_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(field, format!("is too short (minimum is {min} characters)"));
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn merge_accumulates_messages_for_shared_fields() {
        let mut root = FieldErrors::single("name", BLANK);
        let mut child = FieldErrors::single("name", TAKEN);
        child.add("developer", BLANK);
        root.merge(child);

        assert_eq!(root.get("name"), Some(&[BLANK.to_string(), TAKEN.to_string()][..]));
        assert!(root.contains_key("developer"));
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn serializes_as_plain_object() {
        let errors = FieldErrors::single("base", "nope");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"base": ["nope"]}));
    }

    #[test]
    fn presence_rejects_whitespace() {
        let mut errors = FieldErrors::new();
        presence(&mut errors, "name", "  ");
        presence(&mut errors, "code", "ok");
        presence_of::<f64>(&mut errors, "price", None);
        assert!(errors.contains_key("name"));
        assert!(!errors.contains_key("code"));
        assert!(errors.contains_key("price"));
    }

    #[test]
    fn numeric_bounds() {
        let mut errors = FieldErrors::new();
        greater_than(&mut errors, "price", Some(0.0), 0.0);
        greater_than(&mut errors, "ok", Some(0.01), 0.0);
        greater_than_or_equal_to(&mut errors, "max_use", Some(-1), 0);
        greater_than_or_equal_to(&mut errors, "zero", Some(0), 0);
        assert_eq!(errors.get("price"), Some(&["must be greater than 0".to_string()][..]));
        assert!(!errors.contains_key("ok"));
        assert!(errors.contains_key("max_use"));
        assert!(!errors.contains_key("zero"));
    }

    #[test]
    fn future_date_rejects_now_and_past() {
        let now = Utc::now();
        let mut errors = FieldErrors::new();
        future_date(&mut errors, "past", Some(&(now - Duration::days(1))), now);
        future_date(&mut errors, "now", Some(&now), now);
        future_date(&mut errors, "future", Some(&(now + Duration::hours(1))), now);
        assert!(errors.contains_key("past"));
        assert!(errors.contains_key("now"));
        assert!(!errors.contains_key("future"));
    }
}
