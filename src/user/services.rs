use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password_blocking, verify_password_blocking},
        repo::UserStore,
        repo_types::User,
    },
    error::{AppError, AppResult},
    id::RecordId,
    state::AppState,
};

/// Profile reads and updates for the authenticated user.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserStore>,
}

impl FromRef<AppState> for ProfileService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone())
    }
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn get_profile(&self, owner: RecordId) -> AppResult<User> {
        self.users
            .find_by_id(owner)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub async fn update_profile(&self, owner: RecordId, name: &str) -> AppResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        if let Some(user) = self.users.update_name(owner, name).await? {
            info!(user_id = %owner, "profile updated");
            return Ok(user);
        }

        // The update returned nothing; read once more before giving up.
        warn!(user_id = %owner, "update_name returned no row; re-reading");
        self.users
            .find_by_id(owner)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub async fn change_password(
        &self,
        owner: RecordId,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if current_password.is_empty() || new_password.is_empty() {
            return Err(AppError::validation(
                "Both current and new password are required",
            ));
        }

        let user = self
            .users
            .find_by_id(owner)
            .await?
            .filter(|u| !u.password_hash.is_empty())
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !verify_password_blocking(current_password, &user.password_hash).await? {
            warn!(user_id = %owner, "change_password with wrong current password");
            return Err(AppError::unauthorized("Current password is incorrect"));
        }

        let hash = hash_password_blocking(new_password).await?;
        if !self.users.update_password_hash(owner, &hash).await? {
            return Err(AppError::not_found("User not found"));
        }
        info!(user_id = %owner, "password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{
            password::{hash_password, verify_password},
            repo_types::NewUser,
        },
        memory::MemoryStore,
    };
    use async_trait::async_trait;
    use time::OffsetDateTime;

    async fn seeded(store: &MemoryStore, password: &str) -> User {
        UserStore::create(
            store,
            NewUser {
                name: "Ann".into(),
                email: "ann@x.com".into(),
                password_hash: hash_password(password).unwrap(),
                created_at: OffsetDateTime::now_utc(),
            },
        )
        .await
        .unwrap()
        .unwrap()
    }

    #[tokio::test]
    async fn get_profile_of_unknown_user_is_not_found() {
        let svc = ProfileService::new(Arc::new(MemoryStore::new()));
        let err = svc.get_profile(RecordId::new()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_profile_trims_and_persists() {
        let store = MemoryStore::new();
        let user = seeded(&store, "pw").await;
        let svc = ProfileService::new(Arc::new(store));

        let updated = svc.update_profile(user.id, "  Annie ").await.unwrap();
        assert_eq!(updated.name, "Annie");
        assert_eq!(svc.get_profile(user.id).await.unwrap().name, "Annie");
    }

    #[tokio::test]
    async fn update_profile_rejects_blank_name() {
        let store = MemoryStore::new();
        let user = seeded(&store, "pw").await;
        let svc = ProfileService::new(Arc::new(store));
        let err = svc.update_profile(user.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    /// Applies updates but never reports the updated row.
    struct ForgetfulUsers(MemoryStore);

    #[async_trait]
    impl UserStore for ForgetfulUsers {
        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            self.0.find_by_email(email).await
        }
        async fn find_by_id(&self, id: RecordId) -> anyhow::Result<Option<User>> {
            self.0.find_by_id(id).await
        }
        async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
            UserStore::create(&self.0, new).await
        }
        async fn update_name(&self, id: RecordId, name: &str) -> anyhow::Result<Option<User>> {
            self.0.update_name(id, name).await?;
            Ok(None)
        }
        async fn update_password_hash(&self, id: RecordId, hash: &str) -> anyhow::Result<bool> {
            self.0.update_password_hash(id, hash).await
        }
    }

    #[tokio::test]
    async fn update_profile_falls_back_to_read() {
        let store = MemoryStore::new();
        let user = seeded(&store, "pw").await;
        let svc = ProfileService::new(Arc::new(ForgetfulUsers(store)));

        let updated = svc.update_profile(user.id, "Annie").await.unwrap();
        assert_eq!(updated.name, "Annie");

        let err = svc.update_profile(RecordId::new(), "Ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn change_password_verifies_current() {
        let store = MemoryStore::new();
        let user = seeded(&store, "old-pw").await;
        let svc = ProfileService::new(Arc::new(store.clone()));

        let err = svc.change_password(user.id, "wrong", "new-pw").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        svc.change_password(user.id, "old-pw", "new-pw").await.unwrap();
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(verify_password("new-pw", &stored.password_hash));
        assert!(!verify_password("old-pw", &stored.password_hash));
    }

    #[tokio::test]
    async fn change_password_validation_and_missing_user() {
        let svc = ProfileService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            svc.change_password(RecordId::new(), "", "x").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            svc.change_password(RecordId::new(), "a", "b").await,
            Err(AppError::NotFound(_))
        ));
    }
}
