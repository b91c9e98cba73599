use crate::infrastructure::pool::PoolConfig;
use anyhow::Context;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Signing configuration for bearer tokens
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret. `None` means a fresh secret per process start.
    pub secret: Option<String>,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            access_token_expiry: 60 * 60,
            refresh_token_expiry: 7 * 24 * 60 * 60,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub pool: PoolConfig,
    pub jwt: JwtConfig,
    pub cors_allowed_origins: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let defaults = PoolConfig::default();
        let jwt_defaults = JwtConfig::default();

        Ok(Self {
            port: env_or("APP_PORT", 8080),
            database_url,
            pool: PoolConfig {
                max_size: env_or("DB_MAX_CONNECTIONS", defaults.max_size),
                acquire_attempts: env_or("DB_ACQUIRE_ATTEMPTS", defaults.acquire_attempts),
                retry_delay: Duration::from_millis(env_or(
                    "DB_ACQUIRE_RETRY_DELAY_MS",
                    defaults.retry_delay.as_millis() as u64,
                )),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
                access_token_expiry: env_or(
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    jwt_defaults.access_token_expiry,
                ),
                refresh_token_expiry: env_or(
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    jwt_defaults.refresh_token_expiry,
                ),
            },
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
        })
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}
