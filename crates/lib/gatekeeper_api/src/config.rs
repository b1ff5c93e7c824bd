//! API server configuration.

use chrono::Duration;
use gatekeeper_core::auth::token::{DEFAULT_TOKEN_TTL_MINUTES, SigningConfig, resolve_secret};

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: i64,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                      | Default                                  |
    /// |-------------------------------|------------------------------------------|
    /// | `BIND_ADDR`                   | `127.0.0.1:8000`                         |
    /// | `DATABASE_URL`                | `postgres://localhost:5432/gatekeeper`   |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES` | `30`                                     |
    /// | `JWT_SECRET` / `AUTH_SECRET`  | generated & persisted to file            |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/gatekeeper".into()),
            token_ttl_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Build the signing config from the resolved secret and configured TTL.
    pub fn signing(&self) -> SigningConfig {
        SigningConfig::new(resolve_secret(), Duration::minutes(self.token_ttl_minutes))
    }
}
