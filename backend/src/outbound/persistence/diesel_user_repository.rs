//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The aggregate is read as a user row plus its career rows in ascending id
//! order. `save` runs in one transaction: the user row is inserted or
//! updated, then the stored career collection is reconciled with the
//! aggregate (matched rows updated, new rows inserted, missing rows deleted).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{CareerHistory, Period, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    CareerHistoryChangeset, CareerHistoryRow, NewCareerHistoryRow, NewUserRow, UserChangeset,
    UserRow,
};
use super::pool::DbPool;
use super::schema::{career_histories, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn row_to_history(row: CareerHistoryRow) -> CareerHistory {
    CareerHistory {
        id: Some(row.id),
        title: row.title,
        period: Period {
            from: row.period_from,
            to: row.period_to,
        },
    }
}

fn row_to_user(row: UserRow, histories: Vec<CareerHistory>) -> User {
    User {
        id: Some(UserId::new(row.id)),
        name: row.name,
        age: row.age,
        birthday: row.birthday,
        height: row.height,
        zip_code: row.zip_code,
        career_histories: histories,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Attach career rows to their owners, preserving the order of `rows`.
fn assemble(rows: Vec<UserRow>, history_rows: Vec<CareerHistoryRow>) -> Vec<User> {
    let mut by_owner: HashMap<i64, Vec<CareerHistory>> = HashMap::new();
    for history in history_rows {
        by_owner
            .entry(history.user_id)
            .or_default()
            .push(row_to_history(history));
    }
    rows.into_iter()
        .map(|row| {
            let histories = by_owner.remove(&row.id).unwrap_or_default();
            row_to_user(row, histories)
        })
        .collect()
}

async fn load_histories(
    conn: &mut AsyncPgConnection,
    owners: &[i64],
) -> Result<Vec<CareerHistoryRow>, diesel::result::Error> {
    if owners.is_empty() {
        return Ok(Vec::new());
    }
    career_histories::table
        .filter(career_histories::user_id.eq_any(owners))
        .order((career_histories::user_id.asc(), career_histories::id.asc()))
        .select(CareerHistoryRow::as_select())
        .load(conn)
        .await
}

async fn write_user_row(
    conn: &mut AsyncPgConnection,
    user: &User,
) -> Result<i64, diesel::result::Error> {
    if let Some(id) = user.id {
        let changes = UserChangeset {
            name: &user.name,
            age: user.age,
            birthday: user.birthday,
            height: user.height,
            zip_code: user.zip_code.as_deref(),
            updated_at: &user.updated_at,
        };
        let touched = diesel::update(users::table.find(id.as_i64()))
            .set(&changes)
            .execute(conn)
            .await?;
        if touched == 0 {
            return Err(diesel::result::Error::NotFound);
        }
        return Ok(id.as_i64());
    }

    let row = NewUserRow {
        name: &user.name,
        age: user.age,
        birthday: user.birthday,
        height: user.height,
        zip_code: user.zip_code.as_deref(),
        created_at: &user.created_at,
        updated_at: &user.updated_at,
    };
    diesel::insert_into(users::table)
        .values(&row)
        .returning(users::id)
        .get_result(conn)
        .await
}

/// Reconcile stored career rows of `user_id` with `histories`.
async fn sync_histories(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    histories: &[CareerHistory],
) -> Result<(), diesel::result::Error> {
    let stored: HashSet<i64> = career_histories::table
        .filter(career_histories::user_id.eq(user_id))
        .select(career_histories::id)
        .load::<i64>(conn)
        .await?
        .into_iter()
        .collect();
    let kept: HashSet<i64> = histories.iter().filter_map(|history| history.id).collect();

    let orphans: Vec<i64> = stored.difference(&kept).copied().collect();
    if !orphans.is_empty() {
        diesel::delete(career_histories::table.filter(career_histories::id.eq_any(&orphans)))
            .execute(conn)
            .await?;
    }

    for history in histories {
        match history.id.filter(|id| stored.contains(id)) {
            Some(id) => {
                let changes = CareerHistoryChangeset {
                    title: &history.title,
                    period_from: history.period.from,
                    period_to: history.period.to,
                };
                diesel::update(
                    career_histories::table
                        .filter(career_histories::id.eq(id))
                        .filter(career_histories::user_id.eq(user_id)),
                )
                .set(&changes)
                .execute(conn)
                .await?;
            }
            None => {
                let row = NewCareerHistoryRow {
                    user_id,
                    title: &history.title,
                    period_from: history.period.from,
                    period_to: history.period.to,
                };
                diesel::insert_into(career_histories::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
            }
        }
    }
    debug!(user_id, removed = orphans.len(), kept = histories.len(), "career histories synced");
    Ok(())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        self.find_with_histories_by_id(id).await
    }

    async fn find_with_histories_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_i64())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let histories = load_histories(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        Ok(assemble(vec![row], histories).pop())
    }

    async fn save(&self, user: &User) -> Result<UserId, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = conn
            .transaction::<_, diesel::result::Error, _>(move |conn| {
                async move {
                    let id = write_user_row(conn, user).await?;
                    sync_histories(conn, id, &user.career_histories).await?;
                    Ok(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(UserId::new(id))
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(users::table.find(id.as_i64()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(user_id = id.as_i64(), removed, "user delete executed");
        Ok(())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(users::table.filter(users::name.eq(name))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn exists_by_name_excluding(
        &self,
        name: &str,
        excluded: UserId,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            users::table
                .filter(users::name.eq(name))
                .filter(users::id.ne(excluded.as_i64())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn count_by_name_contains(
        &self,
        name_filter: Option<String>,
    ) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = users::table.select(count_star()).into_boxed();
        if let Some(needle) = name_filter {
            query = query.filter(users::name.like(contains_pattern(&needle)));
        }
        let total: i64 = query
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn find_page(
        &self,
        name_filter: Option<String>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = users::table
            .select(UserRow::as_select())
            .order(users::id.asc())
            .offset(to_sql_count(offset))
            .into_boxed();
        if let Some(needle) = name_filter {
            query = query.filter(users::name.like(contains_pattern(&needle)));
        }
        if let Some(limit) = limit {
            query = query.limit(to_sql_count(limit));
        }
        let rows: Vec<UserRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;

        let owners: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let histories = load_histories(&mut conn, &owners)
            .await
            .map_err(map_diesel_error)?;
        Ok(assemble(rows, histories))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn user_row(id: i64, name: &str) -> UserRow {
        UserRow {
            id,
            name: name.to_owned(),
            age: 30,
            birthday: date(1994, 4, 1),
            height: Some(170.4),
            zip_code: None,
            created_at: "2026-02-24 10:30:00".to_owned(),
            updated_at: "2026-02-24 10:30:00".to_owned(),
        }
    }

    fn history_row(id: i64, user_id: i64) -> CareerHistoryRow {
        CareerHistoryRow {
            id,
            user_id,
            title: format!("role {id}"),
            period_from: date(2010, 4, 1),
            period_to: date(2012, 3, 31),
        }
    }

    #[rstest]
    #[case("Taro", "%Taro%")]
    #[case("50%_off", "%50\\%\\_off%")]
    #[case("a\\b", "%a\\\\b%")]
    fn contains_pattern_escapes_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(needle), expected);
    }

    #[rstest]
    fn assemble_keeps_user_order_and_groups_histories() {
        let users = assemble(
            vec![user_row(3, "Jiro"), user_row(1, "Taro")],
            vec![history_row(4, 1), history_row(7, 1), history_row(9, 3)],
        );

        let shape: Vec<_> = users
            .iter()
            .map(|user| {
                let ids: Vec<_> = user.career_histories.iter().filter_map(|h| h.id).collect();
                (user.name.as_str(), ids)
            })
            .collect();
        assert_eq!(shape, vec![("Jiro", vec![9]), ("Taro", vec![4, 7])]);
    }

    #[rstest]
    fn user_without_histories_gets_empty_collection() {
        let users = assemble(vec![user_row(2, "Hanako")], Vec::new());
        assert_eq!(users[0].id, Some(UserId::new(2)));
        assert!(users[0].career_histories.is_empty());
    }
}
