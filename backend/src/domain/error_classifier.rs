//! Severity classification and error payload assembly.
//!
//! [`classify`] turns accumulated violations into a single typed abort; the
//! precedence is structural input (bad request) over rule failures
//! (unprocessable) over duplicates (conflict). [`ErrorResponse::from_error`]
//! is the one place an abort becomes a wire payload and logs the outcome.

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, FieldViolation, ViolationKind};

/// Choose the severity for a set of violations.
///
/// Returns `None` when there is nothing to report.
///
/// # Examples
/// ```
/// use user_registry::domain::error_classifier::classify;
/// use user_registry::domain::{ErrorCode, FieldViolation, ViolationLocation};
///
/// let rule = FieldViolation::validation("age must be at most 150", "age", ViolationLocation::Body);
/// let missing = FieldViolation::structural("name is required", ViolationLocation::Body);
///
/// assert_eq!(classify(vec![rule.clone()]).map(|e| e.code()), Some(ErrorCode::UnprocessableEntity));
/// assert_eq!(classify(vec![rule, missing]).map(|e| e.code()), Some(ErrorCode::BadRequest));
/// assert!(classify(Vec::new()).is_none());
/// ```
#[must_use]
pub fn classify(violations: Vec<FieldViolation>) -> Option<Error> {
    let code = severity(&violations)?;
    Some(Error::bare(code).with_violations(violations))
}

/// Severity implied by `violations`, if any.
#[must_use]
pub fn severity(violations: &[FieldViolation]) -> Option<ErrorCode> {
    if violations.is_empty() {
        return None;
    }
    let has = |kind: ViolationKind| violations.iter().any(|v| v.kind() == kind);
    let code = if has(ViolationKind::Structural) {
        ErrorCode::BadRequest
    } else if has(ViolationKind::Rule) {
        ErrorCode::UnprocessableEntity
    } else {
        ErrorCode::Conflict
    };
    Some(code)
}

/// Wire shape of every error response.
///
/// `traceId` is always present (empty when unknown); `errors` is omitted
/// entirely when there are no details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: ErrorCode,
    #[schema(example = "Validation failed")]
    pub message: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

impl ErrorResponse {
    /// Assemble the payload for `error`, logging the outcome.
    ///
    /// Internal errors are redacted to their default message and lose their
    /// details.
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        let code = error.code();
        let trace_id = error.trace_id().unwrap_or_default().to_owned();

        if code.is_client_error() {
            info!(
                code = ?code,
                message = error.message(),
                trace_id = %trace_id,
                violations = error.violations().len(),
                "request rejected"
            );
            Self {
                code,
                message: error.message().to_owned(),
                trace_id,
                errors: error.violations().to_vec(),
            }
        } else {
            error!(
                code = ?code,
                message = error.message(),
                trace_id = %trace_id,
                violations = ?error.violations(),
                "request failed"
            );
            Self {
                code,
                message: code.default_message().to_owned(),
                trace_id,
                errors: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TraceId, ViolationLocation};
    use rstest::rstest;
    use serde_json::json;

    fn rule() -> FieldViolation {
        FieldViolation::validation("age must be at most 150", "age", ViolationLocation::Body)
    }

    fn structural() -> FieldViolation {
        FieldViolation::validation("birthday is required", "birthday", ViolationLocation::Body)
            .with_kind(ViolationKind::Structural)
    }

    #[rstest]
    #[case(vec![structural()], ErrorCode::BadRequest)]
    #[case(vec![rule(), structural()], ErrorCode::BadRequest)]
    #[case(vec![FieldViolation::duplicate("name"), structural()], ErrorCode::BadRequest)]
    #[case(vec![rule()], ErrorCode::UnprocessableEntity)]
    #[case(vec![FieldViolation::duplicate("name"), rule()], ErrorCode::UnprocessableEntity)]
    #[case(vec![FieldViolation::duplicate("name")], ErrorCode::Conflict)]
    fn precedence(#[case] violations: Vec<FieldViolation>, #[case] expected: ErrorCode) {
        assert_eq!(severity(&violations), Some(expected));
    }

    #[rstest]
    fn classify_keeps_violation_order() {
        let error = classify(vec![rule(), structural()]).expect("error");
        let fields: Vec<_> = error.violations().iter().map(FieldViolation::field).collect();
        assert_eq!(fields, [Some("age"), Some("birthday")]);
    }

    #[rstest]
    fn payload_omits_empty_errors_and_echoes_empty_trace() {
        let payload = ErrorResponse::from_error(&Error::not_found("User not found"));
        let value = serde_json::to_value(&payload).expect("serialise payload");
        assert_eq!(
            value,
            json!({
                "code": "NOT_FOUND",
                "message": "User not found",
                "traceId": "",
            })
        );
    }

    #[rstest]
    fn payload_uses_default_message_when_absent() {
        let error = classify(vec![rule()]).expect("error");
        let payload = ErrorResponse::from_error(&error);
        assert_eq!(payload.message, "Validation failed");
        assert_eq!(payload.errors.len(), 1);
    }

    #[rstest]
    fn internal_errors_are_redacted() {
        let error = Error::internal("database password leaked").with_violations([rule()]);
        let payload = ErrorResponse::from_error(&error);
        assert_eq!(payload.code, ErrorCode::InternalServerError);
        assert_eq!(payload.message, "Unexpected error");
        assert!(payload.errors.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn payload_carries_request_trace_id() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000001"
            .parse()
            .expect("valid UUID");
        let error = TraceId::scope(trace_id, async { Error::conflict("Duplicate resource") }).await;
        let payload = ErrorResponse::from_error(&error);
        assert_eq!(payload.trace_id, "00000000-0000-0000-0000-000000000001");
    }
}
