//! Driving port for user mutations.
//!
//! Inbound adapters hand raw payloads to this port; validation, uniqueness
//! checks and the career history merge all happen behind it.

use async_trait::async_trait;

use crate::domain::{Error, UserCreatePayload, UserId, UserUpdatePayload};

/// Domain use-case port for creating, updating and deleting users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and store a new user, returning its identity.
    async fn create_user(&self, payload: UserCreatePayload) -> Result<UserId, Error>;

    /// Apply a sparse update to an existing user.
    async fn update_user(&self, id: UserId, payload: UserUpdatePayload) -> Result<(), Error>;

    /// Remove a user; deleting an unknown id succeeds.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}
