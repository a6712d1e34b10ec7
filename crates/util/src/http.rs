//! # HTTP Utilities
//!
//! Helpers for turning backend responses into user-facing messages and typed
//! values.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use simctl_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("simctl login"));
/// assert!(status_error_message(500).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: run `simctl login <user>` or set SIMCTL_USER".into()),
        403 => Some("Forbidden (403). Hint: the current user cannot access this resource".into()),
        404 => Some("Not found (404). Hint: check SIMCTL_API_BASE and the resource identifier".into()),
        _ => None,
    }
}

/// Extract the most specific error text from a backend error body.
///
/// The backend reports failures as `{"details": ...}`, `{"error": ...}` or
/// `{"message": ...}`; `details` is preferred when several are present.
///
/// # Example
/// ```rust
/// use simctl_util::http::backend_error_detail;
///
/// let body = r#"{"error": "bad request", "details": "gateway gw9 does not exist"}"#;
/// assert_eq!(backend_error_detail(body).as_deref(), Some("gateway gw9 does not exist"));
/// assert!(backend_error_detail("<html>").is_none());
/// ```
pub fn backend_error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["details", "error", "message"].iter().find_map(|key| match value.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
        Some(other @ (Value::Object(_) | Value::Array(_))) => Some(other.to_string()),
        _ => None,
    })
}

/// Parse response text as JSON, returning a descriptive error when the body
/// is empty or does not match `T`.
pub fn parse_response_json_strict<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    if text.trim().is_empty() {
        return Err("empty response body".to_string());
    }
    serde_json::from_str(text).map_err(|error| format!("unexpected response shape: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_details_over_error() {
        assert_eq!(backend_error_detail(r#"{"error": "nope"}"#).as_deref(), Some("nope"));
        assert_eq!(backend_error_detail(r#"{"error": "", "message": "m"}"#).as_deref(), Some("m"));
        assert_eq!(backend_error_detail(r#"{"ok": true}"#), None);
    }

    #[test]
    fn strict_parse_rejects_empty_and_mismatched_bodies() {
        assert!(parse_response_json_strict::<Value>("  ").is_err());
        assert!(parse_response_json_strict::<Vec<u32>>(r#"{"a": 1}"#).is_err());
        assert_eq!(parse_response_json_strict::<Vec<u32>>("[1, 2]").unwrap(), vec![1, 2]);
    }
}
