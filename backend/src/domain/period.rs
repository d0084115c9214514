//! Period consistency check.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{FieldViolation, ViolationCode, ViolationLocation};

/// Reason attached to inverted periods.
pub const PERIOD_FROM_AFTER_TO: &str = "period.from must be on/before period.to";

/// Field path reported for inverted periods.
pub const PERIOD_FIELD: &str = "careerHistories.period";

/// Check that `from` is on or before `to`.
///
/// Either side being unresolved skips the check; absence is the required
/// rule's concern.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use user_registry::domain::period::check;
///
/// let from = NaiveDate::from_ymd_opt(2010, 4, 1);
/// let to = NaiveDate::from_ymd_opt(2009, 1, 1);
/// assert!(check(from, to).is_err());
/// assert!(check(from, None).is_ok());
/// ```
pub fn check(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), FieldViolation> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(FieldViolation::new(
            ViolationCode::InvalidPeriod,
            PERIOD_FROM_AFTER_TO,
            ViolationLocation::Body,
        )
        .at_field(PERIOD_FIELD)
        .with_constraints(json!({
            "from": from.to_string(),
            "to": to.to_string(),
        }))),
        _ => Ok(()),
    }
}
