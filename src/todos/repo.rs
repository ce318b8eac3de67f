use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::{
    id::RecordId,
    todos::repo_types::{NewTodo, Todo, TodoChanges},
};

/// Persistence for todo records. Every lookup by id is also filtered by owner.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Most recently created first. Order among todos sharing a `created_at`
    /// is backend-specific: Postgres sorts them by id (stable but unrelated
    /// to insertion order), the in-memory store returns the newest insert first.
    async fn list_by_owner(&self, owner: RecordId) -> anyhow::Result<Vec<Todo>>;

    async fn create(&self, new: NewTodo) -> anyhow::Result<Todo>;

    /// Applies `changes` and refreshes `updated_at`, returning the new row.
    async fn update(
        &self,
        owner: RecordId,
        id: RecordId,
        changes: &TodoChanges,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<Todo>>;

    async fn find_owned(&self, owner: RecordId, id: RecordId) -> anyhow::Result<Option<Todo>>;

    /// Returns the number of rows removed.
    async fn delete(&self, owner: RecordId, id: RecordId) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgTodoStore {
    db: PgPool,
}

impl PgTodoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn list_by_owner(&self, owner: RecordId) -> anyhow::Result<Vec<Todo>> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, completed, created_at, updated_at
            FROM todos
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC -- ids are random, ties only need to be repeatable
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, new: NewTodo) -> anyhow::Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (id, user_id, title, completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, user_id, title, completed, created_at, updated_at
            "#,
        )
        .bind(RecordId::new())
        .bind(new.user_id)
        .bind(&new.title)
        .bind(new.completed)
        .bind(new.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(todo)
    }

    async fn update(
        &self,
        owner: RecordId,
        id: RecordId,
        changes: &TodoChanges,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET updated_at = $3,
                title = COALESCE($4, title),
                completed = COALESCE($5, completed)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(updated_at)
        .bind(changes.title.as_deref())
        .bind(changes.completed)
        .fetch_optional(&self.db)
        .await?;
        Ok(todo)
    }

    async fn find_owned(&self, owner: RecordId, id: RecordId) -> anyhow::Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, user_id, title, completed, created_at, updated_at
            FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;
        Ok(todo)
    }

    async fn delete(&self, owner: RecordId, id: RecordId) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM todos WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
