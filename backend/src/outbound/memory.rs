//! In-process `UserRepository` used for local runs and HTTP tests.
//!
//! Mirrors the PostgreSQL adapter's observable behaviour: identities are
//! assigned from monotonically increasing sequences, names are unique and
//! career histories keep ascending identity order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserId};

#[derive(Debug, Default)]
struct Store {
    last_user_id: i64,
    last_history_id: i64,
    users: BTreeMap<i64, User>,
}

impl Store {
    fn name_taken(&self, name: &str, owner: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|(id, user)| Some(*id) != owner && user.name == name)
    }

    fn matching<'a>(&'a self, name_filter: Option<&'a str>) -> impl Iterator<Item = &'a User> + 'a {
        self.users
            .values()
            .filter(move |user| name_filter.is_none_or(|needle| user.name.contains(needle)))
    }
}

/// `UserRepository` backed by a map guarded by a Tokio `RwLock`.
///
/// # Examples
/// ```
/// use user_registry::outbound::memory::InMemoryUserRepository;
///
/// let repo = InMemoryUserRepository::default();
/// # let _ = repo;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: RwLock<Store>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        self.find_with_histories_by_id(id).await
    }

    async fn find_with_histories_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.store.read().await.users.get(&id.as_i64()).cloned())
    }

    async fn save(&self, user: &User) -> Result<UserId, UserPersistenceError> {
        let mut store = self.store.write().await;
        let owner = user.id.map(UserId::as_i64);
        if store.name_taken(&user.name, owner) {
            return Err(UserPersistenceError::duplicate("users_name_key"));
        }

        let id = match owner {
            Some(id) => id,
            None => {
                store.last_user_id += 1;
                store.last_user_id
            }
        };

        let mut stored = user.clone();
        stored.id = Some(UserId::new(id));
        for history in &mut stored.career_histories {
            if history.id.is_none() {
                store.last_history_id += 1;
                history.id = Some(store.last_history_id);
            }
        }
        debug!(user_id = id, histories = stored.career_histories.len(), "stored user");
        store.users.insert(id, stored);
        Ok(UserId::new(id))
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), UserPersistenceError> {
        self.store.write().await.users.remove(&id.as_i64());
        Ok(())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, UserPersistenceError> {
        Ok(self.store.read().await.name_taken(name, None))
    }

    async fn exists_by_name_excluding(
        &self,
        name: &str,
        excluded: UserId,
    ) -> Result<bool, UserPersistenceError> {
        Ok(self
            .store
            .read()
            .await
            .name_taken(name, Some(excluded.as_i64())))
    }

    async fn count_by_name_contains(
        &self,
        name_filter: Option<String>,
    ) -> Result<u64, UserPersistenceError> {
        let store = self.store.read().await;
        let count = store.matching(name_filter.as_deref()).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn find_page(
        &self,
        name_filter: Option<String>,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let store = self.store.read().await;
        let matching = store.matching(name_filter.as_deref()).skip(offset);
        Ok(match limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }
}
