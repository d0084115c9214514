//! Generic rule engine.
//!
//! Payloads expose their fields through [`Validate`]; [`validate`] walks the
//! payload's [`RuleSet`] in declaration order, collects every failing rule
//! (never fail-fast) and descends into nested payloads right after the field
//! that owns them. Output is deterministic for identical input.

use crate::domain::constraints::{DefaultMessages, FieldValue, MessageLookup, RuleSet};
use crate::domain::{FieldViolation, ViolationLocation};

/// A payload the rule engine can inspect.
pub trait Validate {
    /// Rule table describing this payload.
    fn rules(&self) -> &'static RuleSet;

    /// Current value of `field`.
    fn value(&self, field: &str) -> FieldValue<'_>;

    /// Nested payloads owned by `field`, each with the path suffix that
    /// identifies it (`""` for an object, `"[i]"` for list entries).
    fn nested(&self, _field: &str) -> Vec<(String, &dyn Validate)> {
        Vec::new()
    }
}

/// Validate `payload` with the built-in English messages.
///
/// # Examples
/// ```
/// use user_registry::domain::validation::validate;
/// use user_registry::domain::{UserListQuery, ViolationLocation};
///
/// let query = UserListQuery::new(None, 101, 0);
/// let violations = validate(&query, ViolationLocation::Query);
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].field(), Some("limit"));
/// ```
#[must_use]
pub fn validate(payload: &dyn Validate, location: ViolationLocation) -> Vec<FieldViolation> {
    validate_with(payload, location, &DefaultMessages)
}

/// Validate `payload`, resolving messages through `messages`.
#[must_use]
pub fn validate_with(
    payload: &dyn Validate,
    location: ViolationLocation,
    messages: &dyn MessageLookup,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    walk(payload, "", location, messages, &mut violations);
    violations
}

fn walk(
    payload: &dyn Validate,
    prefix: &str,
    location: ViolationLocation,
    messages: &dyn MessageLookup,
    out: &mut Vec<FieldViolation>,
) {
    for field_rules in payload.rules().fields() {
        let field = field_rules.field();
        let path = join_path(prefix, field);
        let value = payload.value(field);

        for rule in field_rules.rules() {
            let constraint = rule.constraint();
            if constraint.is_satisfied(&value) {
                continue;
            }
            let mut violation = FieldViolation::validation(
                messages.resolve(rule.message_key()),
                path.clone(),
                location,
            )
            .with_kind(constraint.kind());
            if let Some(payload) = constraint.payload(&value) {
                violation = violation.with_constraints(payload);
            }
            out.push(violation);
        }

        for (suffix, child) in payload.nested(field) {
            walk(child, &format!("{path}{suffix}"), location, messages, out);
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_owned()
    } else {
        format!("{prefix}.{field}")
    }
}
