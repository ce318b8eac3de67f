use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateTodoRequest, UpdateTodoRequest},
    repo_types::Todo,
    services::TodoService,
};
use crate::{auth::extractors::AuthUser, error::AppResult, state::AppState};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
}

#[instrument(skip(todos))]
pub async fn list_todos(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Todo>>> {
    Ok(Json(todos.list(user_id).await?))
}

#[instrument(skip(todos, body))]
pub async fn create_todo(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> AppResult<(StatusCode, HeaderMap, Json<Todo>)> {
    let Json(payload) = body?;
    let todo = todos.create(user_id, payload).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/todos/{}", todo.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(todo)))
}

#[instrument(skip(todos, body))]
pub async fn update_todo(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> AppResult<Json<Todo>> {
    let Json(payload) = body?;
    Ok(Json(todos.update(user_id, &id, payload).await?))
}

#[instrument(skip(todos))]
pub async fn delete_todo(
    State(todos): State<TodoService>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    todos.delete(user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
