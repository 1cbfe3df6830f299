//! Request parameter helpers shared by the API handlers.

use axum::body::Bytes;
use gamestore_core::{Attributes, Pagination, QueryOptions, QueryResult, Value};
use serde::Serialize;
use serde_json::{json, Map};

use super::error::ApiError;
use crate::service::ServiceError;

/// Raw query string pairs in the order they were sent.
pub type QueryPairs = Vec<(String, String)>;

/// Listing options from `search[field]`, `order[field]`, `page` and `length`.
#[must_use]
pub fn query_options(pairs: &QueryPairs) -> QueryOptions {
    QueryOptions::from_params(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// The attribute bag wrapped under `root` in a JSON body.
///
/// An empty body, a missing wrapper or a non-object wrapper all yield an
/// empty bag.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] if the body is not valid JSON.
pub fn wrapped_attributes(body: &Bytes, root: &str) -> Result<Attributes, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Attributes::new());
    }
    let parsed: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(match parsed.get(root) {
        Some(serde_json::Value::Object(fields)) => fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value.clone())))
            .collect(),
        _ => Attributes::new(),
    })
}

/// `{"<singular>": record}`
///
/// # Errors
///
/// Returns [`ApiError::Service`] if `record` cannot be serialized.
pub fn single<T: Serialize>(root: &str, record: &T) -> Result<serde_json::Value, ApiError> {
    let mut body = Map::new();
    body.insert(root.to_string(), to_json(record)?);
    Ok(serde_json::Value::Object(body))
}

/// `{"<plural>": [records], "meta": pagination}`
///
/// # Errors
///
/// Returns [`ApiError::Service`] if a record cannot be serialized.
pub fn listing<T: Serialize>(root: &str, page: &QueryResult<T>) -> Result<serde_json::Value, ApiError> {
    listing_of(root, &page.records, page.pagination)
}

/// Same as [`listing`] for records that were mapped after loading.
///
/// # Errors
///
/// Returns [`ApiError::Service`] if a record cannot be serialized.
pub fn listing_of<T: Serialize>(
    root: &str,
    records: &[T],
    pagination: Pagination,
) -> Result<serde_json::Value, ApiError> {
    let mut body = Map::new();
    body.insert(root.to_string(), to_json(records)?);
    body.insert("meta".to_string(), json!(pagination));
    Ok(serde_json::Value::Object(body))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Service(ServiceError::Storage(e.into())))
}

#[cfg(test)]
mod tests {
    use gamestore_core::SortDirection;

    use super::*;

    #[test]
    fn query_pairs_become_options() {
        let pairs: QueryPairs = vec![
            ("search[name]".into(), "Search".into()),
            ("order[name]".into(), "desc".into()),
            ("page".into(), "2".into()),
            ("length".into(), "x".into()),
        ];
        let options = query_options(&pairs);
        assert_eq!(options.search[0].1, "Search");
        assert_eq!(options.order[0].1, SortDirection::Desc);
        assert_eq!((options.page, options.length), (2, 10));
    }

    #[test]
    fn wrapped_attributes_unwraps_the_root() {
        let body = Bytes::from_static(br#"{"category": {"name": "Action"}, "other": 1}"#);
        let attrs = wrapped_attributes(&body, "category").unwrap();
        assert_eq!(attrs.get("name"), Some(&Value::from("Action")));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn missing_wrapper_or_body_is_empty() {
        assert!(wrapped_attributes(&Bytes::new(), "category").unwrap().is_empty());
        let body = Bytes::from_static(br#"{"name": "Action"}"#);
        assert!(wrapped_attributes(&body, "category").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let body = Bytes::from_static(b"{not json");
        assert!(matches!(
            wrapped_attributes(&body, "category"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn listing_has_records_and_meta() {
        let body = listing_of("categories", &["a", "b"], Pagination::new(1, 10, 2)).unwrap();
        assert_eq!(body["categories"], json!(["a", "b"]));
        assert_eq!(body["meta"]["total_pages"], 1);
    }
}
