use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::memory::MemoryStore;
use crate::todos::repo::{PgTodoStore, TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let Some(database_url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data will not persist");
            return Ok(Self::in_memory(config));
        };

        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;

        // Migrations may be managed externally
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgTodoStore::new(db)),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
    ) -> Self {
        Self {
            config,
            users,
            todos,
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = MemoryStore::new();
        Self::from_parts(config, Arc::new(store.clone()), Arc::new(store))
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::in_memory(Arc::new(AppConfig::for_tests()))
    }
}
