//! User domain service.
//!
//! Implements the user driving ports on top of a [`UserRepository`]. Every
//! request is validated before any storage call; uniqueness is checked
//! against the repository and backed by the store's unique index, so a race
//! between check and write still surfaces as a conflict.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::error::messages;
use crate::domain::error_classifier::classify;
use crate::domain::merge::merge;
use crate::domain::period;
use crate::domain::ports::{UserPersistenceError, UserRepository, UsersCommand, UsersQuery};
use crate::domain::user::format_timestamp;
use crate::domain::user_payloads::UserChanges;
use crate::domain::validation::validate;
use crate::domain::{
    Error, FieldViolation, User, UserCreatePayload, UserId, UserListQuery, UserUpdatePayload,
    ViolationCode, ViolationKind, ViolationLocation,
};

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { message } => {
            debug!(%message, "unique index rejected user write");
            duplicate_name()
        }
    }
}

fn duplicate_name() -> Error {
    Error::conflict(messages::DUPLICATE_RESOURCE).with_violations([FieldViolation::duplicate("name")])
}

fn invalid_user_id(id: UserId) -> Error {
    Error::bad_request(messages::INVALID_USER_ID).with_violations([FieldViolation::validation(
        format!("user {id} does not exist"),
        "user_id",
        ViolationLocation::Path,
    )
    .with_kind(ViolationKind::Structural)])
}

/// Turn accumulated violations into a single abort.
fn reject(violations: Vec<FieldViolation>) -> Error {
    let only_periods = !violations.is_empty()
        && violations
            .iter()
            .all(|violation| violation.code() == ViolationCode::InvalidPeriod);
    let Some(error) = classify(violations) else {
        return Error::internal("request rejected without violations");
    };
    if only_periods {
        error.with_message(messages::INVALID_PERIOD)
    } else {
        error
    }
}

fn period_violations(user: &User) -> Vec<FieldViolation> {
    user.career_histories
        .iter()
        .filter_map(|entry| period::check(Some(entry.period.from), Some(entry.period.to)).err())
        .collect()
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}

/// User service implementing the user driving ports.
#[derive(Clone)]
pub struct UserService<R> {
    user_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserService<R> {
    /// Create a new service with the user repository and a clock for
    /// timestamps.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use user_registry::domain::UserService;
    /// # use user_registry::outbound::memory::InMemoryUserRepository;
    /// let service = UserService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(user_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { user_repo, clock }
    }

    fn now(&self) -> String {
        format_timestamp(self.clock.utc())
    }
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    async fn ensure_name_free(&self, name: &str, owner: Option<UserId>) -> Result<(), Error> {
        let taken = match owner {
            Some(id) => self.user_repo.exists_by_name_excluding(name, id).await,
            None => self.user_repo.exists_by_name(name).await,
        }
        .map_err(map_persistence_error)?;
        if taken {
            return Err(duplicate_name());
        }
        Ok(())
    }

    fn apply_changes(user: &mut User, changes: UserChanges) -> Result<(), Error> {
        let UserChanges {
            name,
            age,
            birthday,
            height,
            zip_code,
            career_histories,
        } = changes;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(age) = age {
            user.age = age;
        }
        if let Some(birthday) = birthday {
            user.birthday = birthday;
        }
        if height.is_some() {
            user.height = height;
        }
        if zip_code.is_some() {
            user.zip_code = zip_code;
        }
        if let Some(updates) = career_histories {
            user.career_histories = merge(&user.career_histories, &updates)
                .into_result()
                .map_err(reject)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, payload: UserCreatePayload) -> Result<UserId, Error> {
        let mut user = payload.into_user().map_err(reject)?;

        let violations = period_violations(&user);
        if !violations.is_empty() {
            return Err(reject(violations));
        }

        self.ensure_name_free(&user.name, None).await?;

        let now = self.now();
        user.created_at.clone_from(&now);
        user.updated_at = now;

        let id = self
            .user_repo
            .save(&user)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %id, histories = user.career_histories.len(), "user created");
        Ok(id)
    }

    async fn update_user(&self, id: UserId, payload: UserUpdatePayload) -> Result<(), Error> {
        let changes = payload.into_changes().map_err(reject)?;

        let mut user = self
            .user_repo
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| invalid_user_id(id))?;

        if let Some(name) = changes.name.as_deref() {
            self.ensure_name_free(name, Some(id)).await?;
        }

        Self::apply_changes(&mut user, changes)?;
        user.updated_at = self.now();

        self.user_repo
            .save(&user)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %id, "user updated");
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        self.user_repo
            .delete_by_id(id)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository,
{
    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.user_repo
            .find_with_histories_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(messages::USER_NOT_FOUND))
    }

    async fn list_users(&self, query: &UserListQuery) -> Result<Vec<User>, Error> {
        let violations = validate(query, ViolationLocation::Query);
        if !violations.is_empty() {
            return Err(reject(violations));
        }

        let name_filter = query.name_filter().map(str::to_owned);
        let offset = to_usize(query.offset);

        if query.limit == 0 {
            let users = self
                .user_repo
                .find_page(name_filter, None, 0)
                .await
                .map_err(map_persistence_error)?;
            return Ok(users.into_iter().skip(offset).collect());
        }

        self.user_repo
            .find_page(name_filter, Some(to_usize(query.limit)), offset)
            .await
            .map_err(map_persistence_error)
    }

    async fn count_users(&self, query: &UserListQuery) -> Result<u64, Error> {
        self.user_repo
            .count_by_name_contains(query.name_filter().map(str::to_owned))
            .await
            .map_err(map_persistence_error)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
