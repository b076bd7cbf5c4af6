//! User repository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use vidova_models::User;

use crate::error::{DbError, DbResult};
use crate::models::UserRow;

/// Data access for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; fails with [`DbError::Duplicate`] when the
    /// email is already registered.
    async fn create(&self, user: &User) -> DbResult<()>;

    /// Find a user by their unique ID.
    async fn find_by_id(&self, id: &str) -> DbResult<Option<User>>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>>;
}

/// SQLx implementation of [`UserRepository`].
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, role, organization_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.organization_id)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Created user {} ({})", user.username, user.id);
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(DbError::duplicate("user", &user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }
}
