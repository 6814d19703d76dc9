//! Runtime configuration.
//!
//! Loaded from environment variables (a `.env` file is honoured by the binaries):
//! - `DATABASE_URL`: sqlite url, or `memory` for the process-local store (default: `sqlite://todos.db`)
//! - `BIND_ADDR`: listen address (default: `127.0.0.1:8000`)
//! - `CORS_ALLOWED_ORIGIN`: the single origin allowed to call the API (default: `http://localhost:3000`)

use std::net::{AddrParseError, SocketAddr};

use http::HeaderValue;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// `DATABASE_URL` value selecting the in-memory store.
pub const MEMORY_STORE: &str = "memory";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub allowed_origin: HeaderValue,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BIND_ADDR {value:?} is not a socket address: {source}")]
    InvalidBindAddr { value: String, source: AddrParseError },

    #[error("CORS_ALLOWED_ORIGIN {value:?} must look like http(s)://host[:port]")]
    InvalidOrigin { value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database_url = get("DATABASE_URL", DEFAULT_DATABASE_URL);

        let bind = get("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr { value: bind.clone(), source })?;

        let origin = get("CORS_ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN);
        let allowed_origin = parse_origin(&origin)?;

        Ok(Self { database_url, bind_addr, allowed_origin })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_STORE
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            allowed_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
        }
    }
}

fn parse_origin(value: &str) -> Result<HeaderValue, ConfigError> {
    let invalid = || ConfigError::InvalidOrigin { value: value.to_string() };
    let host = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .ok_or_else(invalid)?;
    if host.is_empty() || host.contains('/') {
        return Err(invalid());
    }
    HeaderValue::from_str(value).map_err(|_| invalid())
}
