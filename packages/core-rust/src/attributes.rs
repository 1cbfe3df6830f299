//! Coercing reader that applies a dynamic [`Attributes`] bag onto typed
//! entity fields.
//!
//! Only keys present in the bag are touched, so an update leaves every
//! unsupplied field as it was. Values that cannot be coerced to the target
//! type are recorded as field errors and the field is cleared, which makes
//! the subsequent presence check fail for the same field.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::types::{Attributes, Id, Value};
use crate::validation::{FieldErrors, INVALID, NOT_AN_INTEGER, NOT_A_DATE, NOT_A_NUMBER, NOT_IN_LIST};

/// Reads typed values out of an attribute bag, collecting coercion errors.
pub struct AttributeReader<'a> {
    attrs: &'a Attributes,
    errors: FieldErrors,
}

impl<'a> AttributeReader<'a> {
    #[must_use]
    pub fn new(attrs: &'a Attributes) -> Self {
        Self {
            attrs,
            errors: FieldErrors::new(),
        }
    }

    /// Free text. `null` becomes the empty string; scalars are stringified.
    pub fn text(&mut self, key: &str, target: &mut String) {
        if let Some(value) = self.attrs.get(key) {
            *target = match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
        }
    }

    /// Optional free text; `null` and blank strings clear the field.
    pub fn optional_text(&mut self, key: &str, target: &mut Option<String>) {
        if let Some(value) = self.attrs.get(key) {
            *target = if value.is_blank() {
                None
            } else {
                Some(value.to_string())
            };
        }
    }

    pub fn number(&mut self, key: &str, target: &mut Option<f64>) {
        if let Some(value) = self.attrs.get(key) {
            *target = if value.is_blank() {
                None
            } else if let Some(n) = value.as_f64().filter(|n| n.is_finite()) {
                Some(n)
            } else {
                self.errors.add(key, NOT_A_NUMBER);
                None
            };
        }
    }

    pub fn integer(&mut self, key: &str, target: &mut Option<i64>) {
        if let Some(value) = self.attrs.get(key) {
            *target = if value.is_blank() {
                None
            } else if let Some(n) = value.as_i64() {
                Some(n)
            } else {
                self.errors.add(key, NOT_AN_INTEGER);
                None
            };
        }
    }

    pub fn id(&mut self, key: &str, target: &mut Option<Id>) {
        if let Some(value) = self.attrs.get(key) {
            *target = if value.is_blank() {
                None
            } else if let Some(id) = value.as_i64().filter(|id| *id > 0) {
                Some(id)
            } else {
                self.errors.add(key, INVALID);
                None
            };
        }
    }

    /// Booleans; blank input means `false`.
    pub fn boolean(&mut self, key: &str, target: &mut bool) {
        if let Some(value) = self.attrs.get(key) {
            if value.is_blank() {
                *target = false;
            } else if let Some(b) = value.as_bool() {
                *target = b;
            } else {
                self.errors.add(key, INVALID);
            }
        }
    }

    /// Date/time in RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`.
    pub fn datetime(&mut self, key: &str, target: &mut Option<DateTime<Utc>>) {
        if let Some(value) = self.attrs.get(key) {
            *target = if value.is_blank() {
                None
            } else if let Some(date) = value.as_str().and_then(parse_datetime) {
                Some(date)
            } else {
                self.errors.add(key, NOT_A_DATE);
                None
            };
        }
    }

    /// Enumerated value parsed through `FromStr`.
    pub fn choice<T: FromStr>(&mut self, key: &str, target: &mut Option<T>) {
        if let Some(value) = self.attrs.get(key) {
            *target = if value.is_blank() {
                None
            } else if let Some(parsed) = value.as_str().and_then(|s| s.trim().parse().ok()) {
                Some(parsed)
            } else {
                self.errors.add(key, NOT_IN_LIST);
                None
            };
        }
    }

    /// Consumes the reader, returning the coercion errors it collected.
    #[must_use]
    pub fn finish(self) -> FieldErrors {
        self.errors
    }
}

/// Parses the date formats accepted from API clients.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Keeps only the permitted keys of `attrs`.
#[must_use]
pub fn permit(attrs: &Attributes, permitted: &[&str]) -> Attributes {
    attrs
        .iter()
        .filter(|(key, _)| permitted.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn attrs(json: &str) -> Attributes {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn absent_keys_leave_targets_untouched() {
        let bag = attrs(r#"{}"#);
        let mut reader = AttributeReader::new(&bag);
        let mut name = "kept".to_string();
        let mut price = Some(9.5);
        reader.text("name", &mut name);
        reader.number("price", &mut price);
        assert!(reader.finish().is_empty());
        assert_eq!(name, "kept");
        assert_eq!(price, Some(9.5));
    }

    #[test]
    fn coercion_failures_become_field_errors() {
        let bag = attrs(r#"{"price": "abc", "max_use": 1.5, "due_date": "soon", "status": "weird"}"#);
        let mut reader = AttributeReader::new(&bag);
        let mut price = Some(1.0);
        let mut max_use = None;
        let mut due = None;
        let mut status: Option<i32> = None;
        reader.number("price", &mut price);
        reader.integer("max_use", &mut max_use);
        reader.datetime("due_date", &mut due);
        reader.choice("status", &mut status);
        let errors = reader.finish();
        assert_eq!(price, None);
        assert!(errors.contains_key("price"));
        assert!(errors.contains_key("max_use"));
        assert!(errors.contains_key("due_date"));
        assert!(errors.contains_key("status"));
    }

    #[test]
    fn text_accepts_scalars_and_null() {
        let bag = attrs(r#"{"a": null, "b": 12, "c": "x"}"#);
        let mut reader = AttributeReader::new(&bag);
        let (mut a, mut b, mut c) = ("old".to_string(), String::new(), String::new());
        reader.text("a", &mut a);
        reader.text("b", &mut b);
        reader.text("c", &mut c);
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("", "12", "x"));
    }

    #[test]
    fn parses_supported_date_formats() {
        assert_eq!(parse_datetime("2020-11-21 10:34:23").unwrap().day(), 21);
        assert_eq!(parse_datetime("2020-11-21").unwrap().month(), 11);
        assert!(parse_datetime("2020-11-21T10:34:23Z").is_some());
        assert!(parse_datetime("2020-11-21T10:34:23+03:00").is_some());
        assert!(parse_datetime("21/11/2020").is_none());
    }

    #[test]
    fn permit_filters_keys() {
        let bag = attrs(r#"{"name": "x", "admin": true}"#);
        let permitted = permit(&bag, &["name"]);
        assert_eq!(permitted.len(), 1);
        assert!(permitted.contains_key("name"));
    }
}
