//! Backend errors and generic error-message extraction

use crate::constants::DEFAULT_ERROR_MESSAGE;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `message` comes from the body's `detail` field
    #[error("{message}")]
    Backend {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("{}", DEFAULT_ERROR_MESSAGE)]
    Transport(#[source] reqwest::Error),

    #[error("{}", DEFAULT_ERROR_MESSAGE)]
    Decode(#[source] reqwest::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e)
        } else {
            ApiError::Transport(e)
        }
    }
}

impl ApiError {
    #[cfg(test)]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            ApiError::Transport(e) | ApiError::Decode(e) => e.status(),
            ApiError::InvalidBaseUrl(_) => None,
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Reads `detail`: strings pass through, arrays are joined with `", "`
/// (validation error objects contribute their `msg`). Anything unusable
/// yields [`DEFAULT_ERROR_MESSAGE`].
pub fn extract_error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return DEFAULT_ERROR_MESSAGE.to_string();
    };

    let message = match value.get("detail") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(describe_detail_item)
            .collect::<Vec<_>>()
            .join(", "),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };

    if message.trim().is_empty() {
        DEFAULT_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

fn describe_detail_item(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("msg") {
            Some(Value::String(msg)) => msg.clone(),
            _ => item.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_passes_through() {
        let body = br#"{"detail": "Session not found"}"#;
        assert_eq!(extract_error_message(body), "Session not found");
    }

    #[test]
    fn array_detail_is_joined() {
        let body = br#"{"detail": ["first", "second"]}"#;
        assert_eq!(extract_error_message(body), "first, second");
    }

    #[test]
    fn validation_objects_contribute_msg() {
        let body = br#"{"detail": [
            {"loc": ["body", "player_name"], "msg": "str type expected", "type": "type_error.str"},
            {"loc": ["body"], "msg": "field required", "type": "value_error.missing"}
        ]}"#;
        assert_eq!(
            extract_error_message(body),
            "str type expected, field required"
        );
    }

    #[test]
    fn missing_detail_uses_default() {
        assert_eq!(extract_error_message(br#"{"error": "x"}"#), DEFAULT_ERROR_MESSAGE);
        assert_eq!(extract_error_message(br#"{"detail": null}"#), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn non_json_body_uses_default() {
        assert_eq!(extract_error_message(b"Internal Server Error"), DEFAULT_ERROR_MESSAGE);
        assert_eq!(extract_error_message(b""), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn empty_array_uses_default() {
        assert_eq!(extract_error_message(br#"{"detail": []}"#), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn scalar_detail_is_stringified() {
        assert_eq!(extract_error_message(br#"{"detail": 42}"#), "42");
    }

    #[test]
    fn backend_error_displays_message() {
        let err = ApiError::Backend {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: "Session already completed".into(),
        };
        assert_eq!(err.to_string(), "Session already completed");
        assert_eq!(err.status(), Some(reqwest::StatusCode::BAD_REQUEST));
    }
}
