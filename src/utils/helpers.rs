use axum::{Json, http::HeaderMap};
use serde::Serialize;

pub fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).expect("Failed to serialize to JSON")
}

pub fn json_response<T: Serialize>(value: &T) -> Json<serde_json::Value> {
    Json(to_json(value))
}

pub fn json_list<T: Serialize>(items: Vec<T>) -> Json<Vec<serde_json::Value>> {
    Json(items.into_iter().map(|item| to_json(&item)).collect())
}

pub fn extract_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get(crate::middleware::auth::AUTH_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Human-facing name of an object key: everything after the random prefix,
/// i.e. after the first `-`. Keys without a prefix are shown as-is.
pub fn display_name(object_key: &str) -> &str {
    match object_key.split_once('-') {
        Some((_, rest)) => rest,
        None => object_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_prefix() {
        assert_eq!(display_name("ab12cd-report.pdf"), "report.pdf");
    }

    #[test]
    fn test_display_name_keeps_later_dashes() {
        assert_eq!(display_name("x9y8z7-my-notes-v2.txt"), "my-notes-v2.txt");
    }

    #[test]
    fn test_display_name_without_prefix() {
        assert_eq!(display_name("report.pdf"), "report.pdf");
    }
}
