//! Inbound user payloads and their conversion into domain values.
//!
//! Payload fields are all optional and dates stay as raw strings so that
//! absence and bad formats surface as field violations instead of
//! deserialisation failures. Each payload maps onto one rule table from
//! [`crate::domain::constraints`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::constraints::{
    CAREER_HISTORY_CREATE_RULES, CAREER_HISTORY_UPDATE_RULES, FieldValue, LIST_QUERY_RULES,
    PERIOD_CREATE_RULES, PERIOD_UPDATE_RULES, RuleSet, USER_CREATE_RULES, USER_UPDATE_RULES,
    parse_wire_date,
};
use crate::domain::error::messages;
use crate::domain::merge::CareerHistoryUpdate;
use crate::domain::validation::{Validate, validate};
use crate::domain::{
    CareerHistory, FieldViolation, Period, User, ViolationLocation, height_to_decimal,
    round_height, stored_height,
};

/// Page size applied when the client does not send `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

fn text(value: Option<&String>) -> FieldValue<'_> {
    value.map_or(FieldValue::Absent, |text| FieldValue::Text(text))
}

fn date(value: Option<&String>) -> FieldValue<'_> {
    value.map_or(FieldValue::Absent, |raw| FieldValue::Date(raw))
}

fn height(value: Option<f64>) -> FieldValue<'static> {
    value.map_or(FieldValue::Absent, |height| {
        let checked = if height < 0.0 {
            // Negative input must not round up into range.
            height_to_decimal(height).unwrap_or(Decimal::MIN)
        } else {
            height_to_decimal(height).map_or(Decimal::MAX, round_height)
        };
        FieldValue::Decimal(checked)
    })
}

fn entries<T: Validate>(items: &[T]) -> Vec<(String, &dyn Validate)> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| (format!("[{index}]"), item as &dyn Validate))
        .collect()
}

fn incomplete() -> Vec<FieldViolation> {
    vec![FieldViolation::structural(
        messages::VALIDATION_FAILED,
        ViolationLocation::Body,
    )]
}

/// Body of `POST /api/v1/users`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatePayload {
    #[schema(example = "Taro Yamada", min_length = 1, max_length = 200)]
    pub name: Option<String>,
    #[schema(example = 30, minimum = 0, maximum = 150)]
    pub age: Option<i64>,
    #[schema(example = "1994/04/01", format = "yyyy/MM/dd")]
    pub birthday: Option<String>,
    #[schema(example = 170.5, minimum = 0.0, maximum = 300.0)]
    pub height: Option<f64>,
    #[schema(example = "123-4567", pattern = "^[0-9]{3}-[0-9]{4}$")]
    pub zip_code: Option<String>,
    pub career_histories: Option<Vec<CareerHistoryPayload>>,
}

/// Career entry inside a create body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareerHistoryPayload {
    pub id: Option<i64>,
    #[schema(example = "Software Engineer")]
    pub title: Option<String>,
    pub period: Option<PeriodPayload>,
}

/// Period inside a create body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PeriodPayload {
    #[schema(example = "2018/04/01")]
    pub from: Option<String>,
    #[schema(example = "2021/03/31")]
    pub to: Option<String>,
}

impl Validate for UserCreatePayload {
    fn rules(&self) -> &'static RuleSet {
        &USER_CREATE_RULES
    }

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "name" => text(self.name.as_ref()),
            "age" => self.age.map_or(FieldValue::Absent, FieldValue::Integer),
            "birthday" => date(self.birthday.as_ref()),
            "height" => height(self.height),
            "zipCode" => text(self.zip_code.as_ref()),
            "careerHistories" => self
                .career_histories
                .as_ref()
                .map_or(FieldValue::Absent, |items| FieldValue::List(items.len())),
            _ => FieldValue::Absent,
        }
    }

    fn nested(&self, field: &str) -> Vec<(String, &dyn Validate)> {
        match (field, &self.career_histories) {
            ("careerHistories", Some(items)) => entries(items),
            _ => Vec::new(),
        }
    }
}

impl Validate for CareerHistoryPayload {
    fn rules(&self) -> &'static RuleSet {
        &CAREER_HISTORY_CREATE_RULES
    }

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "title" => text(self.title.as_ref()),
            "period" => self
                .period
                .as_ref()
                .map_or(FieldValue::Absent, |_| FieldValue::Object),
            _ => FieldValue::Absent,
        }
    }

    fn nested(&self, field: &str) -> Vec<(String, &dyn Validate)> {
        match (field, &self.period) {
            ("period", Some(period)) => vec![(String::new(), period as &dyn Validate)],
            _ => Vec::new(),
        }
    }
}

impl Validate for PeriodPayload {
    fn rules(&self) -> &'static RuleSet {
        &PERIOD_CREATE_RULES
    }

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "from" => date(self.from.as_ref()),
            "to" => date(self.to.as_ref()),
            _ => FieldValue::Absent,
        }
    }
}

impl UserCreatePayload {
    /// Validate the payload and build an unsaved aggregate.
    ///
    /// The returned user has no identity and empty timestamps; the height is
    /// already rounded.
    ///
    /// # Errors
    /// Returns every field violation found, in declaration order.
    pub fn into_user(self) -> Result<User, Vec<FieldViolation>> {
        let violations = validate(&self, ViolationLocation::Body);
        if !violations.is_empty() {
            return Err(violations);
        }

        let Self {
            name,
            age,
            birthday,
            height,
            zip_code,
            career_histories,
        } = self;
        let (Some(name), Some(age), Some(birthday)) = (
            name,
            age.and_then(|age| i32::try_from(age).ok()),
            birthday.as_deref().and_then(parse_wire_date),
        ) else {
            return Err(incomplete());
        };

        let career_histories = career_histories
            .unwrap_or_default()
            .into_iter()
            .map(CareerHistoryPayload::into_career_history)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(incomplete)?;

        Ok(User {
            id: None,
            name,
            age,
            birthday,
            height: height.and_then(stored_height),
            zip_code,
            career_histories,
            created_at: String::new(),
            updated_at: String::new(),
        })
    }
}

impl CareerHistoryPayload {
    fn into_career_history(self) -> Option<CareerHistory> {
        let period = self.period?;
        Some(CareerHistory {
            id: None,
            title: self.title?,
            period: Period {
                from: period.from.as_deref().and_then(parse_wire_date)?,
                to: period.to.as_deref().and_then(parse_wire_date)?,
            },
        })
    }
}

/// Body of `PUT /api/v1/users/{user_id}`; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdatePayload {
    #[schema(example = "Hanako Suzuki")]
    pub name: Option<String>,
    pub age: Option<i64>,
    #[schema(example = "1990/01/15")]
    pub birthday: Option<String>,
    pub height: Option<f64>,
    pub zip_code: Option<String>,
    pub career_histories: Option<Vec<CareerHistoryUpdatePayload>>,
}

/// Career entry inside an update body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareerHistoryUpdatePayload {
    /// Identity of the entry to patch; absent or unknown appends a new entry.
    pub id: Option<i64>,
    pub title: Option<String>,
    pub period: Option<PeriodUpdatePayload>,
}

/// Period inside an update body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PeriodUpdatePayload {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Validate for UserUpdatePayload {
    fn rules(&self) -> &'static RuleSet {
        &USER_UPDATE_RULES
    }

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "name" => text(self.name.as_ref()),
            "age" => self.age.map_or(FieldValue::Absent, FieldValue::Integer),
            "birthday" => date(self.birthday.as_ref()),
            "height" => height(self.height),
            "zipCode" => text(self.zip_code.as_ref()),
            "careerHistories" => self
                .career_histories
                .as_ref()
                .map_or(FieldValue::Absent, |items| FieldValue::List(items.len())),
            _ => FieldValue::Absent,
        }
    }

    fn nested(&self, field: &str) -> Vec<(String, &dyn Validate)> {
        match (field, &self.career_histories) {
            ("careerHistories", Some(items)) => entries(items),
            _ => Vec::new(),
        }
    }
}

impl Validate for CareerHistoryUpdatePayload {
    fn rules(&self) -> &'static RuleSet {
        &CAREER_HISTORY_UPDATE_RULES
    }

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "title" => text(self.title.as_ref()),
            "period" => self
                .period
                .as_ref()
                .map_or(FieldValue::Absent, |_| FieldValue::Object),
            _ => FieldValue::Absent,
        }
    }

    fn nested(&self, field: &str) -> Vec<(String, &dyn Validate)> {
        match (field, &self.period) {
            ("period", Some(period)) => vec![(String::new(), period as &dyn Validate)],
            _ => Vec::new(),
        }
    }
}

impl Validate for PeriodUpdatePayload {
    fn rules(&self) -> &'static RuleSet {
        &PERIOD_UPDATE_RULES
    }

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "from" => date(self.from.as_ref()),
            "to" => date(self.to.as_ref()),
            _ => FieldValue::Absent,
        }
    }
}

/// Validated, typed form of an update body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub birthday: Option<chrono::NaiveDate>,
    /// Already rounded.
    pub height: Option<f64>,
    pub zip_code: Option<String>,
    pub career_histories: Option<Vec<CareerHistoryUpdate>>,
}

impl UserUpdatePayload {
    /// Validate the supplied fields and convert them into typed changes.
    ///
    /// # Errors
    /// Returns every field violation found, in declaration order.
    pub fn into_changes(self) -> Result<UserChanges, Vec<FieldViolation>> {
        let violations = validate(&self, ViolationLocation::Body);
        if !violations.is_empty() {
            return Err(violations);
        }

        let age = match self.age {
            Some(age) => Some(i32::try_from(age).map_err(|_| incomplete())?),
            None => None,
        };
        let career_histories = self.career_histories.map(|items| {
            items
                .into_iter()
                .map(|item| {
                    let (from, to) = item.period.map_or((None, None), |period| {
                        (
                            period.from.as_deref().and_then(parse_wire_date),
                            period.to.as_deref().and_then(parse_wire_date),
                        )
                    });
                    CareerHistoryUpdate {
                        id: item.id,
                        title: item.title,
                        from,
                        to,
                    }
                })
                .collect()
        });

        Ok(UserChanges {
            name: self.name,
            age,
            birthday: self.birthday.as_deref().and_then(parse_wire_date),
            height: self.height.and_then(stored_height),
            zip_code: self.zip_code,
            career_histories,
        })
    }
}

/// Query parameters of `GET /api/v1/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// Substring filter on the name.
    #[param(min_length = 1, max_length = 200, pattern = ".*[^0-9].*")]
    pub name: Option<String>,
    /// Page size; `0` means unbounded.
    #[serde(default = "default_limit")]
    #[param(minimum = 0, maximum = 100, default = 10)]
    pub limit: i64,
    /// Number of leading results to skip.
    #[serde(default)]
    #[param(minimum = 0, default = 0)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self::new(None, DEFAULT_LIMIT, 0)
    }
}

impl UserListQuery {
    /// Build a query from its parts.
    #[must_use]
    pub fn new(name: Option<String>, limit: i64, offset: i64) -> Self {
        Self {
            name,
            limit,
            offset,
        }
    }

    /// Name filter to apply; blank names mean "no filter".
    #[must_use]
    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

impl Validate for UserListQuery {
    fn rules(&self) -> &'static RuleSet {
        &LIST_QUERY_RULES
    }

    fn value(&self, field: &str) -> FieldValue<'_> {
        match field {
            "name" => text(self.name.as_ref()),
            "limit" => FieldValue::Integer(self.limit),
            "offset" => FieldValue::Integer(self.offset),
            _ => FieldValue::Absent,
        }
    }
}
