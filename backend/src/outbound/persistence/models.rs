//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::NaiveDate;
use diesel::prelude::*;

use super::schema::{career_histories, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub birthday: NaiveDate,
    pub height: Option<f64>,
    pub zip_code: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub age: i32,
    pub birthday: NaiveDate,
    pub height: Option<f64>,
    pub zip_code: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Changeset replacing every mutable user column.
///
/// `None` clears nullable columns rather than leaving them untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub age: i32,
    pub birthday: NaiveDate,
    pub height: Option<f64>,
    pub zip_code: Option<&'a str>,
    pub updated_at: &'a str,
}

/// Row struct for reading from the career_histories table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = career_histories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CareerHistoryRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
}

/// Insertable struct for appending career entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = career_histories)]
pub(crate) struct NewCareerHistoryRow<'a> {
    pub user_id: i64,
    pub title: &'a str,
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
}

/// Changeset for a career entry matched by identity.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = career_histories)]
pub(crate) struct CareerHistoryChangeset<'a> {
    pub title: &'a str,
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
}
