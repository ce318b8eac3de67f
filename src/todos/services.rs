use std::sync::Arc;

use axum::extract::FromRef;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{
    dto::{CreateTodoRequest, UpdateTodoRequest},
    repo::TodoStore,
    repo_types::{NewTodo, Todo, TodoChanges},
};
use crate::{
    error::{AppError, AppResult},
    field::Field,
    id::RecordId,
    state::AppState,
};

const TITLE_REQUIRED: &str = "Title is required";
const COMPLETED_NOT_BOOL: &str = "'completed' must be a boolean";

/// Owner-scoped todo operations.
#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoStore>,
}

impl FromRef<AppState> for TodoService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.todos.clone())
    }
}

fn parse_title(value: &Value) -> AppResult<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(TITLE_REQUIRED))
}

fn parse_completed(value: &Value) -> AppResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| AppError::validation(COMPLETED_NOT_BOOL))
}

fn parse_id(raw: &str) -> AppResult<RecordId> {
    RecordId::parse(raw).ok_or_else(|| AppError::validation("Invalid todo id"))
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoStore>) -> Self {
        Self { todos }
    }

    pub async fn create(&self, owner: RecordId, req: CreateTodoRequest) -> AppResult<Todo> {
        let title = match &req.title {
            Field::Present(v) => parse_title(v)?,
            Field::Absent => return Err(AppError::validation(TITLE_REQUIRED)),
        };
        let completed = match &req.completed {
            Field::Present(v) => parse_completed(v)?,
            Field::Absent => false,
        };

        let todo = self
            .todos
            .create(NewTodo {
                user_id: owner,
                title,
                completed,
                created_at: OffsetDateTime::now_utc(),
            })
            .await?;
        info!(user_id = %owner, todo_id = %todo.id, "todo created");
        Ok(todo)
    }

    /// Newest first.
    pub async fn list(&self, owner: RecordId) -> AppResult<Vec<Todo>> {
        let todos = self.todos.list_by_owner(owner).await?;
        debug!(user_id = %owner, count = todos.len(), "todos listed");
        Ok(todos)
    }

    pub async fn update(
        &self,
        owner: RecordId,
        raw_id: &str,
        req: UpdateTodoRequest,
    ) -> AppResult<Todo> {
        let id = parse_id(raw_id)?;

        let mut changes = TodoChanges::default();
        if let Some(v) = req.title.as_present() {
            changes.title = Some(parse_title(v)?);
        }
        if let Some(v) = req.completed.as_present() {
            changes.completed = Some(parse_completed(v)?);
        }
        if changes.is_empty() {
            return Err(AppError::validation("No valid fields to update"));
        }

        let now = OffsetDateTime::now_utc();
        if let Some(todo) = self.todos.update(owner, id, &changes, now).await? {
            info!(user_id = %owner, todo_id = %id, "todo updated");
            return Ok(todo);
        }

        // No row came back from the update; confirm with a plain read.
        match self.todos.find_owned(owner, id).await? {
            Some(todo) => {
                warn!(user_id = %owner, todo_id = %id, "update returned no row but todo exists");
                Ok(todo)
            }
            None => Err(AppError::not_found("Todo not found")),
        }
    }

    pub async fn delete(&self, owner: RecordId, raw_id: &str) -> AppResult<()> {
        let id = parse_id(raw_id)?;
        if self.todos.delete(owner, id).await? == 0 {
            return Err(AppError::not_found("Todo not found"));
        }
        info!(user_id = %owner, todo_id = %id, "todo deleted");
        Ok(())
    }
}
