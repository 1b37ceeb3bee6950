//! Management API error type.

use std::collections::BTreeMap;
use thiserror::Error;

/// Structured error returned by the management API.
///
/// `status` is `None` when the request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
    /// Per-field validation errors.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(Some(404), format!("{} not found", what.into()))
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn with_field_error(mut self, field: impl Into<String>, error: impl Into<String>) -> Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(error.into());
        self
    }

    /// The resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(ApiError::not_found("currency btc").is_not_found());
        assert!(!ApiError::new(Some(422), "invalid").is_not_found());
        assert!(!ApiError::transport("connection refused").is_not_found());
    }

    #[test]
    fn test_field_errors_accumulate() {
        let err = ApiError::new(Some(422), "validation failed")
            .with_field_error("code", "taken")
            .with_field_error("code", "too long");
        assert_eq!(err.errors["code"], vec!["taken", "too long"]);
        assert_eq!(err.to_string(), "validation failed");
    }
}
