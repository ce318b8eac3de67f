use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{
    config::{JwtConfig, MAX_TTL_MINUTES},
    id::RecordId,
    state::AppState,
};

/// Signing and verification keys for bearer tokens.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(cfg.ttl_minutes.clamp(1, MAX_TTL_MINUTES) as u64 * 60),
        }
    }

    pub fn issue(&self, owner_id: RecordId, email: &str) -> anyhow::Result<String> {
        self.issue_at(owner_id, email, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        owner_id: RecordId,
        email: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<String> {
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: owner_id.to_string(),
            email: email.to_string(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %owner_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, expiry, issuer and audience. Any failure is `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(user_id = %data.claims.sub, "jwt verified");
                Some(data.claims)
            }
            Err(e) => {
                debug!(error = %e, "jwt rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn issue_and_verify() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let owner = RecordId::new();
        let token = keys.issue(owner, "ann@x.com").expect("issue");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, owner.to_string());
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn expiry_is_one_hour_after_issuance() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let now = OffsetDateTime::now_utc();
        let token = keys.issue_at(RecordId::new(), "a@b.c", now).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn oversized_ttl_is_clamped() {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: i64::MAX,
        });
        assert_eq!(keys.ttl, Duration::from_secs(MAX_TTL_MINUTES as u64 * 60));

        let token = keys.issue(RecordId::new(), "a@b.c").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TTL_MINUTES as usize * 60);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let two_hours_ago = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let token = keys.issue_at(RecordId::new(), "a@b.c", two_hours_ago).unwrap();
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_other_secret() {
        let good = make_keys("secret-a", "iss", "aud");
        let bad = make_keys("secret-b", "iss", "aud");
        let token = good.issue(RecordId::new(), "a@b.c").unwrap();
        assert!(bad.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue(RecordId::new(), "a@b.c").unwrap();
        assert!(bad.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert!(keys.verify("").is_none());
        assert!(keys.verify("not.a.jwt").is_none());
    }
}
