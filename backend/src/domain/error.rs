//! Domain-level error payload.
//!
//! Transport agnostic: inbound adapters translate these into HTTP status
//! codes and JSON bodies; lower layers construct them from port errors
//! without ever deciding a status code themselves.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Stable machine-readable code naming the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with existing state, e.g. a duplicate key.
    Conflict,
    /// A required backing service cannot be reached.
    ServiceUnavailable,
    /// An unexpected failure inside the service.
    InternalError,
}

/// Error payload handed to adapters.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "not_found")]
    code: ErrorCode,
    #[schema(example = "user 66f1a0b2c3d4e5f6a7b8c9d0 does not exist")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error, panicking if the message fails validation.
    ///
    /// # Panics
    /// Panics when `message` trims to the empty string; call sites pass
    /// literal or formatted text, so this is a programming error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        assert!(
            !message.trim().is_empty(),
            "domain error message must not be empty"
        );
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details, when present.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
