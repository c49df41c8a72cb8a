use async_trait::async_trait;

use crate::database::DatabasePool;
use crate::models::user::{NewUser, User};
use super::errors::RepositoryError;
use super::storage::DatabaseStorage;

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Create a user; fails with `Conflict` if the username is taken
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Look a user up by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
}

/// Repository for user accounts backed by the injected pool
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    /// Create a new repository
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        DatabaseStorage::create_user(&self.pool, &user).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        DatabaseStorage::find_user(&self.pool, username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStorage;

    #[tokio::test]
    async fn test_create_find_and_conflict() {
        let backends = vec![
            DatabasePool::sqlite_in_memory().unwrap(),
            DatabasePool::Memory(InMemoryStorage::new()),
        ];

        for pool in backends {
            let repo = UserRepository::new(pool);
            let user = NewUser {
                username: "charge_nurse".to_string(),
                password_hash: "$argon2id$v=19$stub".to_string(),
                email: Some("nurse@example.org".to_string()),
            };

            let created = repo.create(user.clone()).await.unwrap();
            assert_eq!(created.username, "charge_nurse");

            let found = repo.find_by_username("charge_nurse").await.unwrap();
            assert_eq!(found, Some(created));
            assert_eq!(repo.find_by_username("nobody").await.unwrap(), None);

            assert!(matches!(repo.create(user).await, Err(RepositoryError::Conflict(_))));
        }
    }
}
