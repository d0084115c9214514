//! Field-scoped rule failures.
//!
//! A [`FieldViolation`] is produced by the validator, the period checker, the
//! partial-update merger and the uniqueness check. Its wire form is
//! `{code, reason, field?, location, constraints?}`; the [`ViolationKind`]
//! stays internal and only drives severity classification.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Category tag of a single violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    /// A field rule failed.
    ValidationError,
    /// A unique value is already taken.
    Duplicate,
    /// A period starts after it ends.
    InvalidPeriod,
}

/// Part of the request the violation points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViolationLocation {
    /// JSON request body.
    Body,
    /// Query string parameter.
    Query,
    /// Path parameter.
    Path,
}

/// How a violation weighs when choosing the response severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViolationKind {
    /// Required value absent, unparseable or malformed input.
    Structural,
    /// Well-formed value breaking a field or business rule.
    #[default]
    Rule,
    /// Uniqueness collision.
    Duplicate,
}

/// Reason attached to duplicate-name violations.
pub const NAME_ALREADY_EXISTS: &str = "name already exists";

/// A single field-scoped rule failure.
///
/// # Examples
/// ```
/// use user_registry::domain::{FieldViolation, ViolationLocation};
///
/// let violation = FieldViolation::validation("must be at most 150", "age", ViolationLocation::Body);
/// assert_eq!(violation.field(), Some("age"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    #[schema(example = "VALIDATION_ERROR")]
    code: ViolationCode,
    #[schema(example = "size must be between 1 and 200")]
    reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "careerHistories[0].title")]
    field: Option<String>,
    location: ViolationLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    constraints: Option<Value>,
    #[serde(skip)]
    kind: ViolationKind,
}

impl FieldViolation {
    /// Create a violation without field or constraints.
    pub fn new(code: ViolationCode, reason: impl Into<String>, location: ViolationLocation) -> Self {
        let kind = match code {
            ViolationCode::Duplicate => ViolationKind::Duplicate,
            ViolationCode::ValidationError | ViolationCode::InvalidPeriod => ViolationKind::Rule,
        };
        Self {
            code,
            reason: reason.into(),
            field: None,
            location,
            constraints: None,
            kind,
        }
    }

    /// Rule-shaped validation failure on a named field.
    pub fn validation(
        reason: impl Into<String>,
        field: impl Into<String>,
        location: ViolationLocation,
    ) -> Self {
        Self::new(ViolationCode::ValidationError, reason, location).at_field(field)
    }

    /// Structural failure (missing, unparseable or malformed input).
    pub fn structural(reason: impl Into<String>, location: ViolationLocation) -> Self {
        Self::new(ViolationCode::ValidationError, reason, location)
            .with_kind(ViolationKind::Structural)
    }

    /// Duplicate marker for a unique field.
    pub fn duplicate(field: impl Into<String>) -> Self {
        Self::new(
            ViolationCode::Duplicate,
            NAME_ALREADY_EXISTS,
            ViolationLocation::Body,
        )
        .at_field(field)
        .with_constraints(json!({ "unique": true }))
    }

    /// Attach the dotted field path.
    #[must_use]
    pub fn at_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Attach a structured constraint payload.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Value) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Override the classification weight.
    #[must_use]
    pub fn with_kind(mut self, kind: ViolationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Category tag.
    #[must_use]
    pub fn code(&self) -> ViolationCode {
        self.code
    }

    /// Human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Dotted field path, if the violation targets a field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Request part the violation points at.
    #[must_use]
    pub fn location(&self) -> ViolationLocation {
        self.location
    }

    /// Structured constraint payload.
    #[must_use]
    pub fn constraints(&self) -> Option<&Value> {
        self.constraints.as_ref()
    }

    /// Classification weight.
    #[must_use]
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }
}
