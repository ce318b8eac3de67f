use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// A stored hash that cannot be parsed never matches.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Runs [`hash_password`] on the blocking pool so argon2 never stalls a worker.
pub async fn hash_password_blocking(plain: &str) -> anyhow::Result<String> {
    let plain = plain.to_string();
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("hash_password task")?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let (plain, hash) = (plain.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .context("verify_password task")
}
