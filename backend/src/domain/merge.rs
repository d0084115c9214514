//! Identity-based merge of sparse career history updates.
//!
//! Updates are applied in payload order to a copy of the existing
//! collection. An update whose `id` matches an existing entry patches only the
//! sub-fields it supplies; anything else is a new entry and must supply a
//! title and both period bounds. Every touched entry is re-checked with
//! [`crate::domain::period::check`]. Entries the payload does not mention are
//! kept as they were.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::error::messages;
use crate::domain::period;
use crate::domain::{CareerHistory, FieldViolation, Period, ViolationLocation};

/// Message carried in the constraints of incomplete new entries.
pub const NEW_ENTRY_REQUIREMENT: &str = "title and period are required for new entries";

/// Sparse update for one career entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CareerHistoryUpdate {
    /// Absent or unmatched means "append new".
    pub id: Option<i64>,
    pub title: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Result of a merge: the merged collection plus any violations raised.
///
/// The merged collection must be discarded when violations are present.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub merged: Vec<CareerHistory>,
    pub violations: Vec<FieldViolation>,
}

impl MergeOutcome {
    /// Merged collection when no violation was raised.
    ///
    /// # Errors
    /// Returns the violations when at least one was raised.
    pub fn into_result(self) -> Result<Vec<CareerHistory>, Vec<FieldViolation>> {
        if self.violations.is_empty() {
            Ok(self.merged)
        } else {
            Err(self.violations)
        }
    }
}

/// Merge `updates` into a copy of `existing`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use user_registry::domain::merge::{CareerHistoryUpdate, merge};
/// use user_registry::domain::{CareerHistory, Period};
///
/// let existing = vec![CareerHistory {
///     id: Some(5),
///     title: "Engineer".into(),
///     period: Period {
///         from: NaiveDate::from_ymd_opt(2010, 4, 1).unwrap(),
///         to: NaiveDate::from_ymd_opt(2015, 3, 31).unwrap(),
///     },
/// }];
/// let update = CareerHistoryUpdate {
///     id: Some(5),
///     to: NaiveDate::from_ymd_opt(2009, 1, 1),
///     ..CareerHistoryUpdate::default()
/// };
///
/// let outcome = merge(&existing, &[update]);
/// assert_eq!(outcome.violations.len(), 1);
/// ```
#[must_use]
pub fn merge(existing: &[CareerHistory], updates: &[CareerHistoryUpdate]) -> MergeOutcome {
    let mut merged = existing.to_vec();
    let index: HashMap<i64, usize> = merged
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| entry.id.map(|id| (id, position)))
        .collect();
    let mut violations = Vec::new();

    for update in updates {
        let matched = update
            .id
            .and_then(|id| index.get(&id).copied())
            .and_then(|position| merged.get_mut(position));

        match matched {
            Some(entry) => {
                apply(entry, update);
                if let Err(violation) = period::check(Some(entry.period.from), Some(entry.period.to))
                {
                    violations.push(violation);
                }
            }
            None => match new_entry(update) {
                Some(entry) => {
                    match period::check(Some(entry.period.from), Some(entry.period.to)) {
                        Ok(()) => merged.push(entry),
                        Err(violation) => violations.push(violation),
                    }
                }
                None => violations.push(incomplete_new_entry()),
            },
        }
    }

    MergeOutcome { merged, violations }
}

fn apply(entry: &mut CareerHistory, update: &CareerHistoryUpdate) {
    if let Some(title) = &update.title {
        entry.title.clone_from(title);
    }
    if let Some(from) = update.from {
        entry.period.from = from;
    }
    if let Some(to) = update.to {
        entry.period.to = to;
    }
}

fn new_entry(update: &CareerHistoryUpdate) -> Option<CareerHistory> {
    let (Some(title), Some(from), Some(to)) = (&update.title, update.from, update.to) else {
        return None;
    };
    Some(CareerHistory {
        id: None,
        title: title.clone(),
        period: Period { from, to },
    })
}

fn incomplete_new_entry() -> FieldViolation {
    FieldViolation::validation(
        messages::VALIDATION_FAILED,
        "careerHistories",
        ViolationLocation::Body,
    )
    .with_constraints(json!({ "message": NEW_ENTRY_REQUIREMENT }))
}
