//! User aggregate.
//!
//! A [`User`] owns an ordered collection of [`CareerHistory`] entries and is
//! loaded and persisted as a unit. Entries are kept in ascending identity
//! order; entries created during an update are appended after the persisted
//! ones and receive their identity on save.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Format of the opaque `created_at` / `updated_at` stamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp the way it is stored on the aggregate.
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Identity assigned by persistence on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Inclusive date range of a career entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// One career entry owned by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerHistory {
    /// Present once persisted.
    pub id: Option<i64>,
    pub title: String,
    pub period: Period,
}

/// User aggregate including its career histories.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Present once persisted.
    pub id: Option<UserId>,
    pub name: String,
    pub age: i32,
    pub birthday: NaiveDate,
    /// Rounded half-up to one decimal on write.
    pub height: Option<f64>,
    pub zip_code: Option<String>,
    pub career_histories: Vec<CareerHistory>,
    pub created_at: String,
    pub updated_at: String,
}

/// Convert a submitted height into an exact decimal.
///
/// JSON numbers arrive as `f64`; their shortest textual form is what the
/// client sent, so the conversion goes through it.
#[must_use]
pub fn height_to_decimal(height: f64) -> Option<Decimal> {
    Decimal::from_str(&height.to_string()).ok()
}

/// Round a height half-up to one decimal place.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use user_registry::domain::round_height;
///
/// assert_eq!(round_height(Decimal::new(17044, 2)), Decimal::new(1704, 1));
/// assert_eq!(round_height(Decimal::new(17046, 2)), Decimal::new(1705, 1));
/// assert_eq!(round_height(Decimal::new(17045, 2)), Decimal::new(1705, 1));
/// ```
#[must_use]
pub fn round_height(height: Decimal) -> Decimal {
    height.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a submitted height and convert it to its stored form.
#[must_use]
pub fn stored_height(height: f64) -> Option<f64> {
    let rounded = round_height(height_to_decimal(height)?);
    rounded.to_string().parse().ok()
}
