//! Port abstraction for user persistence adapters and their errors.
//!
//! Adapters load and store the [`User`] aggregate as a unit: career histories
//! are always read with their owner and `save` replaces the stored collection
//! by diff (matched entries updated, new entries inserted, missing entries
//! deleted).
use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique index rejected the write.
        Duplicate { message: String } => "user repository unique violation: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Load the aggregate that an update will mutate.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Load the aggregate for display, histories in ascending id order.
    async fn find_with_histories_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Insert or update the aggregate, returning its identity.
    async fn save(&self, user: &User) -> Result<UserId, UserPersistenceError>;

    /// Remove the user and its histories; a no-op when absent.
    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError>;

    /// Whether any user carries exactly `name`.
    async fn exists_by_name(&self, name: &str) -> Result<bool, UserPersistenceError>;

    /// Whether a user other than `excluded` carries exactly `name`.
    async fn exists_by_name_excluding(
        &self,
        name: &str,
        excluded: UserId,
    ) -> Result<bool, UserPersistenceError>;

    /// Number of users whose name contains `name_filter` (all when `None`).
    async fn count_by_name_contains(
        &self,
        name_filter: Option<String>,
    ) -> Result<u64, UserPersistenceError>;

    /// Users whose name contains `name_filter`, in ascending id order.
    ///
    /// `limit` of `None` means unbounded.
    async fn find_page(
        &self,
        name_filter: Option<String>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<User>, UserPersistenceError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), "user repository connection failed: refused")]
    #[case(UserPersistenceError::query("syntax"), "user repository query failed: syntax")]
    #[case(UserPersistenceError::duplicate("users_name_key"), "user repository unique violation: users_name_key")]
    fn messages_name_the_failure(#[case] error: UserPersistenceError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
