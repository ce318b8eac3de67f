use std::sync::Arc;

use axum::extract::FromRef;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::{
    jwt::JwtKeys,
    password::{hash_password_blocking, verify_password_blocking},
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Signup and login.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), JwtKeys::from_ref(state))
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::MissingFields(
                "Missing name, email, or password".into(),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = hash_password_blocking(password).await?;
        let new = NewUser {
            name: name.to_string(),
            email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        let Some(user) = self.users.create(new).await? else {
            return Err(AppError::Conflict("User already exists".into()));
        };

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Returns a bearer token. Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::MissingFields("Missing email or password".into()));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password_blocking(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.issue(user.id, &user.email)?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, id::RecordId, memory::MemoryStore};

    fn service() -> AuthService {
        let cfg = AppConfig::for_tests();
        AuthService::new(Arc::new(MemoryStore::new()), JwtKeys::from_config(&cfg.jwt))
    }

    #[tokio::test]
    async fn signup_requires_all_fields() {
        let svc = service();
        for (n, e, p) in [("", "a@x.com", "pw"), ("Ann", "", "pw"), ("Ann", "a@x.com", ""), ("  ", "a@x.com", "pw")] {
            let err = svc.signup(n, e, p).await.unwrap_err();
            assert!(matches!(err, AppError::MissingFields(_)), "{n:?} {e:?} {p:?}");
        }
    }

    #[tokio::test]
    async fn signup_twice_conflicts() {
        let svc = service();
        let user = svc.signup("Ann", "ann@x.com", "pw123456").await.unwrap();
        assert_eq!(user.name, "Ann");
        assert_ne!(user.password_hash, "pw123456");

        let err = svc.signup("Other", "ANN@x.com ", "different").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let svc = service();
        let user = svc.signup("Ann", "ann@x.com", "pw123456").await.unwrap();
        let token = svc.login("ann@x.com", "pw123456").await.unwrap();

        let claims = svc.keys.verify(&token).unwrap();
        assert_eq!(RecordId::parse(&claims.sub), Some(user.id));
        assert_eq!(claims.email, "ann@x.com");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service();
        svc.signup("Ann", "ann@x.com", "pw123456").await.unwrap();

        let unknown = svc.login("nobody@x.com", "pw123456").await.unwrap_err();
        let wrong = svc.login("ann@x.com", "nope").await.unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let svc = service();
        assert!(matches!(svc.login("", "pw").await, Err(AppError::MissingFields(_))));
        assert!(matches!(svc.login("a@x.com", "").await, Err(AppError::MissingFields(_))));
    }
}
