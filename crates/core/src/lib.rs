//! Shared primitives for all Rust crates in Partilha.

#![forbid(unsafe_code)]

/// Gateway failure taxonomy and user-facing error classification.
pub mod classification;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use classification::{ClassifiedError, ErrorKind, GatewayError, classify};

/// Result type used across Partilha crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories outside the gateway boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input, configuration or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// No usable credential for the requested operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ClassifiedError> for AppError {
    fn from(value: ClassifiedError) -> Self {
        match value.kind() {
            ErrorKind::Unauthenticated => Self::Unauthorized(value.user_message()),
            ErrorKind::Validation => Self::Validation(value.user_message()),
            _ => Self::Internal(value.user_message()),
        }
    }
}
