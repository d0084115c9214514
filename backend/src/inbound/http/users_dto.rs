//! Response bodies for the users resource.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::constraints::format_wire_date;
use crate::domain::{CareerHistory, User, UserListQuery};

/// Representation of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Taro Yamada")]
    pub name: String,
    #[schema(example = 30)]
    pub age: i32,
    #[schema(example = "1994/04/01")]
    pub birthday: String,
    #[schema(example = 170.4)]
    pub height: Option<f64>,
    #[schema(example = "123-4567")]
    pub zip_code: Option<String>,
    pub career_histories: Vec<CareerHistoryResponse>,
}

/// Representation of one career entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareerHistoryResponse {
    #[schema(example = 5)]
    pub id: Option<i64>,
    #[schema(example = "Engineer")]
    pub title: String,
    pub period: PeriodResponse,
}

/// Period in wire date form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PeriodResponse {
    #[schema(example = "2018/04/01")]
    pub from: String,
    #[schema(example = "2021/03/31")]
    pub to: String,
}

/// Paging metadata of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub offset: i64,
    pub limit: i64,
    pub total: u64,
    pub has_next: bool,
}

/// Body of `GET /api/v1/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// Total number of matching users, not the page size.
    pub count: u64,
    pub page: PageMeta,
    pub users: Vec<UserResponse>,
}

impl From<CareerHistory> for CareerHistoryResponse {
    fn from(entry: CareerHistory) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            period: PeriodResponse {
                from: format_wire_date(entry.period.from),
                to: format_wire_date(entry.period.to),
            },
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map_or(0, |id| id.as_i64()),
            name: user.name,
            age: user.age,
            birthday: format_wire_date(user.birthday),
            height: user.height,
            zip_code: user.zip_code,
            career_histories: user
                .career_histories
                .into_iter()
                .map(CareerHistoryResponse::from)
                .collect(),
        }
    }
}

impl PageMeta {
    /// Metadata for the page selected by `query` out of `total` users.
    ///
    /// # Examples
    /// ```
    /// use user_registry::domain::UserListQuery;
    /// use user_registry::inbound::http::users_dto::PageMeta;
    ///
    /// let page = PageMeta::new(&UserListQuery::new(None, 10, 0), 25);
    /// assert!(page.has_next);
    /// ```
    #[must_use]
    pub fn new(query: &UserListQuery, total: u64) -> Self {
        let total_signed = i64::try_from(total).unwrap_or(i64::MAX);
        Self {
            offset: query.offset,
            limit: query.limit,
            total,
            has_next: query.offset.saturating_add(query.limit) < total_signed,
        }
    }
}

impl UserListResponse {
    /// Assemble the list body.
    #[must_use]
    pub fn new(query: &UserListQuery, total: u64, users: Vec<User>) -> Self {
        Self {
            count: total,
            page: PageMeta::new(query, total),
            users: users.into_iter().map(UserResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{Period, UserId};

    #[rstest]
    #[case(0, 10, 25, true)]
    #[case(20, 10, 25, false)]
    #[case(15, 10, 25, false)]
    #[case(0, 0, 3, true)]
    #[case(0, 10, 0, false)]
    fn has_next_compares_window_end_with_total(
        #[case] offset: i64,
        #[case] limit: i64,
        #[case] total: u64,
        #[case] expected: bool,
    ) {
        let page = PageMeta::new(&UserListQuery::new(None, limit, offset), total);
        assert_eq!(page.has_next, expected);
    }

    #[rstest]
    fn user_serialises_with_wire_dates() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        let user = User {
            id: Some(UserId::new(1)),
            name: "Taro Yamada".to_owned(),
            age: 30,
            birthday: date(1994, 4, 1),
            height: Some(170.4),
            zip_code: None,
            career_histories: vec![CareerHistory {
                id: Some(5),
                title: "Engineer".to_owned(),
                period: Period {
                    from: date(2018, 4, 1),
                    to: date(2021, 3, 31),
                },
            }],
            created_at: String::new(),
            updated_at: String::new(),
        };

        let value = serde_json::to_value(UserResponse::from(user)).expect("serialise");

        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "Taro Yamada",
                "age": 30,
                "birthday": "1994/04/01",
                "height": 170.4,
                "zipCode": null,
                "careerHistories": [{
                    "id": 5,
                    "title": "Engineer",
                    "period": { "from": "2018/04/01", "to": "2021/03/31" }
                }]
            })
        );
    }
}
