use serde::Deserialize;
use tracing::warn;

/// Longest token lifetime accepted from the environment (30 days).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 30;
const DEFAULT_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

/// Unset, unparsable or non-positive values fall back to one hour; larger
/// values are capped at [`MAX_TTL_MINUTES`].
fn parse_ttl_minutes(raw: Option<&str>) -> i64 {
    let minutes = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TTL_MINUTES);
    if minutes > MAX_TTL_MINUTES {
        warn!(minutes, max = MAX_TTL_MINUTES, "JWT_TTL_MINUTES capped");
    }
    minutes.min(MAX_TTL_MINUTES)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "tasknest".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "tasknest-users".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref()),
        };
        Ok(Self {
            database_url,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            jwt,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 60,
            },
        }
    }
}
