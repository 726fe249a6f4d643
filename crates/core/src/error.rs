//! The normalized API error contract.
//!
//! Every failure crossing the HTTP boundary - HTTP status errors, network
//! unreachability, client-side request faults - is reduced to [`ApiError`]
//! before reaching application logic. Callers never inspect raw transport
//! errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback message when the server body carries none.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Normalized error returned by the HTTP access layer.
///
/// `status` is the HTTP status code, or `0` when no response was received
/// (network failure) or the request never left the client. `errors` is
/// present only for field-scoped validation failures (422) and maps field
/// names to ordered message lists.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    /// An error with a message and HTTP status, no field details.
    #[must_use]
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            errors: None,
        }
    }

    /// Synthesized error for a request that got no response at all.
    #[must_use]
    pub fn network() -> Self {
        Self::new("Network error. Please check your connection.", 0)
    }

    /// Synthesized error for a request that never left the client.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "An unexpected error occurred".to_string()
        } else {
            message
        };
        Self::new(message, 0)
    }

    /// Whether this error carries field-scoped validation messages.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        self.errors.is_some()
    }

    /// All field-scoped messages flattened into one ordered list.
    ///
    /// Empty when this is not a validation failure.
    #[must_use]
    pub fn flattened_messages(&self) -> Vec<&str> {
        self.errors
            .as_ref()
            .map(|fields| {
                fields
                    .values()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message() {
        let err = ApiError::new("Product not found", 404);
        assert_eq!(err.to_string(), "Product not found");
        assert_eq!(err.status, 404);
        assert!(!err.is_validation());
    }

    #[test]
    fn test_network_error_has_zero_status() {
        let err = ApiError::network();
        assert_eq!(err.status, 0);
        assert_eq!(err.message, "Network error. Please check your connection.");
    }

    #[test]
    fn test_unexpected_falls_back_to_generic() {
        assert_eq!(
            ApiError::unexpected("").message,
            "An unexpected error occurred"
        );
        assert_eq!(ApiError::unexpected("boom").message, "boom");
    }

    #[test]
    fn test_flattened_messages_preserve_field_order() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "email".to_string(),
            vec!["is taken".to_string(), "is invalid".to_string()],
        );
        fields.insert("password".to_string(), vec!["too short".to_string()]);
        let err = ApiError {
            message: "Validation failed".to_string(),
            status: 422,
            errors: Some(fields),
        };
        assert!(err.is_validation());
        assert_eq!(
            err.flattened_messages(),
            vec!["is taken", "is invalid", "too short"]
        );
    }

    #[test]
    fn test_wire_roundtrip() {
        let err = ApiError::new("nope", 403);
        let json = serde_json::to_string(&err).expect("serialize");
        assert_eq!(json, "{\"message\":\"nope\",\"status\":403}");
        let back: ApiError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, err);
    }
}
