//! Driving port for user-facing queries.
//!
//! Inbound adapters (HTTP handlers) use this port to fetch users without
//! importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId, UserListQuery};

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch one user with its career histories.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// Validate `query` and return the matching page of users.
    async fn list_users(&self, query: &UserListQuery) -> Result<Vec<User>, Error>;

    /// Total number of users matching the name filter of `query`, unpaged.
    async fn count_users(&self, query: &UserListQuery) -> Result<u64, Error>;
}
