use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::AppError, id::RecordId};

/// Extracts and validates the bearer token, yielding the owner id.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub RecordId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

        let Some(claims) = keys.verify(token) else {
            warn!("invalid or expired token");
            return Err(AppError::unauthorized("Unauthorized"));
        };

        // A token whose subject is blank or malformed names no owner.
        let owner = RecordId::parse(&claims.sub).ok_or_else(|| {
            warn!(sub = %claims.sub, "token subject is not a valid id");
            AppError::unauthorized("Unauthorized")
        })?;

        Ok(AuthUser(owner))
    }
}
