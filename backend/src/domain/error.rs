//! Domain-level error types.
//!
//! A single typed abort, [`Error`], is raised per failed request. It carries
//! the severity ([`ErrorCode`]), an optional human message and the field
//! violations accumulated while validating or merging. The HTTP adapter is the
//! only place that turns it into a wire payload (see
//! [`crate::domain::error_classifier`]).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{FieldViolation, TraceId};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Structurally invalid input: missing required values, unparseable data.
    BadRequest,
    /// Well-formed input that breaks a business or field rule.
    UnprocessableEntity,
    /// The request collides with existing state (duplicate name).
    Conflict,
    /// The requested resource does not exist.
    NotFound,
    /// The HTTP verb is not supported for the resource.
    MethodNotAllowed,
    /// The client does not accept a JSON representation.
    NotAcceptable,
    /// An unexpected error occurred.
    InternalServerError,
}

impl ErrorCode {
    /// Message used when the triggering condition carries none.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest | Self::UnprocessableEntity => messages::VALIDATION_FAILED,
            Self::Conflict => messages::DUPLICATE_RESOURCE,
            Self::NotFound => messages::NOT_FOUND,
            Self::MethodNotAllowed => messages::METHOD_NOT_ALLOWED,
            Self::NotAcceptable => messages::NOT_ACCEPTABLE,
            Self::InternalServerError => messages::UNEXPECTED_ERROR,
        }
    }

    /// Whether the outcome is caused by the client rather than the server.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        !matches!(self, Self::InternalServerError)
    }
}

/// Top-level messages shared by the service and the HTTP adapter.
pub mod messages {
    /// Generic validation failure.
    pub const VALIDATION_FAILED: &str = "Validation failed";
    /// Name uniqueness was violated.
    pub const DUPLICATE_RESOURCE: &str = "Duplicate resource";
    /// A career period starts after it ends.
    pub const INVALID_PERIOD: &str = "Invalid period";
    /// Read path could not find the user.
    pub const USER_NOT_FOUND: &str = "User not found";
    /// Update path could not find the user.
    pub const INVALID_USER_ID: &str = "Invalid user_id";
    /// Request body is not JSON or does not match the expected shape.
    pub const MALFORMED_JSON: &str = "Malformed JSON or invalid format";
    /// Unsupported verb.
    pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
    /// Unsupported media type requested.
    pub const NOT_ACCEPTABLE: &str = "Not acceptable";
    /// Path or query parameter has the wrong type.
    pub const TYPE_MISMATCH: &str = "Type mismatch";
    /// Unknown route or resource.
    pub const NOT_FOUND: &str = "Resource not found";
    /// Anything unanticipated.
    pub const UNEXPECTED_ERROR: &str = "Unexpected error";
}

/// Typed abort returned by the use-case layer.
///
/// The trace identifier of the current request, if any, is captured when the
/// error is constructed.
///
/// # Examples
/// ```
/// use user_registry::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("User not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "User not found");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: Option<String>,
    trace_id: Option<String>,
    violations: Vec<FieldViolation>,
}

impl Error {
    /// Create an error with an explicit message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::bare(code).with_message(message)
    }

    /// Create an error that relies on the per-severity default message.
    #[must_use]
    pub fn bare(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
            violations: Vec::new(),
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message, falling back to the code's default when the
    /// stored message is absent or blank.
    #[must_use]
    pub fn message(&self) -> &str {
        match self.message.as_deref() {
            Some(message) if !message.trim().is_empty() => message,
            _ => self.code.default_message(),
        }
    }

    /// Trace identifier captured at construction, if any.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Field violations attached to this error, in detection order.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Replace the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a trace identifier explicitly.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Append violations to the error.
    #[must_use]
    pub fn with_violations(mut self, violations: impl IntoIterator<Item = FieldViolation>) -> Self {
        self.violations.extend(violations);
        self
    }

    /// Convenience constructor for [`ErrorCode::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::UnprocessableEntity`].
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnprocessableEntity, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::MethodNotAllowed`].
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::bare(ErrorCode::MethodNotAllowed)
    }

    /// Convenience constructor for [`ErrorCode::NotAcceptable`].
    #[must_use]
    pub fn not_acceptable() -> Self {
        Self::bare(ErrorCode::NotAcceptable)
    }

    /// Convenience constructor for [`ErrorCode::InternalServerError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for Error {}
