use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    id::RecordId,
    todos::{
        repo::TodoStore,
        repo_types::{NewTodo, Todo, TodoChanges},
    },
};

/// Process-local store used when no database is configured, and by tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<RecordId, User>>>,
    // insertion order, oldest first
    todos: Arc<RwLock<Vec<Todo>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: RecordId) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Ok(None);
        }
        let user = User {
            id: RecordId::new(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: new.created_at,
        };
        users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn update_name(&self, id: RecordId, name: &str) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|u| {
            u.name = name.to_string();
            u.clone()
        }))
    }

    async fn update_password_hash(
        &self,
        id: RecordId,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        Ok(true)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_by_owner(&self, owner: RecordId) -> anyhow::Result<Vec<Todo>> {
        let todos = self.todos.read().await;
        let mut owned: Vec<Todo> = todos
            .iter()
            .rev()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect();
        // stable: equal timestamps keep newest-inserted first
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn create(&self, new: NewTodo) -> anyhow::Result<Todo> {
        let todo = Todo {
            id: RecordId::new(),
            user_id: new.user_id,
            title: new.title,
            completed: new.completed,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update(
        &self,
        owner: RecordId,
        id: RecordId,
        changes: &TodoChanges,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<Option<Todo>> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.iter_mut().find(|t| t.id == id && t.user_id == owner) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            todo.title = title.clone();
        }
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        todo.updated_at = updated_at;
        Ok(Some(todo.clone()))
    }

    async fn find_owned(&self, owner: RecordId, id: RecordId) -> anyhow::Result<Option<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn delete(&self, owner: RecordId, id: RecordId) -> anyhow::Result<u64> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| !(t.id == id && t.user_id == owner));
        Ok((before - todos.len()) as u64)
    }
}
