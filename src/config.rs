use std::env;
use chrono::TimeDelta;
use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// One year; longer session lifetimes are refused at startup.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub auth_secret_key: String,
    pub auth_algorithm: Algorithm,
    pub token_ttl_minutes: i64,
    pub bootstrap_admin_username: String,
    pub bootstrap_admin_password: Option<String>,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                reason: format!("'{}' is not a port number", raw),
            })?,
            None => 3000,
        };

        let algorithm_raw = required("AUTH_ALGORITHM")?;
        let auth_algorithm = parse_hmac_algorithm(&algorithm_raw)?;

        let ttl_raw = required("AUTH_TOKEN_TTL_MINUTES")?;
        let token_ttl_minutes = ttl_raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|m| *m > 0 && *m <= MAX_TOKEN_TTL_MINUTES && TimeDelta::try_minutes(*m).is_some())
            .ok_or_else(|| ConfigError::Invalid {
                key: "AUTH_TOKEN_TTL_MINUTES",
                reason: format!("'{}' is not a number of minutes between 1 and {}", ttl_raw, MAX_TOKEN_TTL_MINUTES),
            })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port,
            auth_secret_key: required("AUTH_SECRET_KEY")?,
            auth_algorithm,
            token_ttl_minutes,
            bootstrap_admin_username: lookup("BOOTSTRAP_ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            bootstrap_admin_password: lookup("BOOTSTRAP_ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "./logs".to_string()),
        })
    }
}

// Tokens and QR labels share one symmetric secret, so only the HMAC family is accepted.
fn parse_hmac_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::Invalid {
            key: "AUTH_ALGORITHM",
            reason: format!("'{}' is not one of HS256, HS384, HS512", other),
        }),
    }
}
