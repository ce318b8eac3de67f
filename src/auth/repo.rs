use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    auth::repo_types::{NewUser, User},
    id::RecordId,
};

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn find_by_id(&self, id: RecordId) -> anyhow::Result<Option<User>>;

    /// Inserts the user, or returns `None` when the email is already taken.
    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>>;

    /// Sets the display name and returns the updated row, if it exists.
    async fn update_name(&self, id: RecordId, name: &str) -> anyhow::Result<Option<User>>;

    /// Returns whether a row was updated.
    async fn update_password_hash(&self, id: RecordId, password_hash: &str)
        -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: RecordId) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(RecordId::new())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.created_at)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(Some(user)),
            // lost a race with a concurrent signup for the same email
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_name(&self, id: RecordId, name: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2
            WHERE id = $1
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: RecordId,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"UPDATE users SET password_hash = $2 WHERE id = $1"#)
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
