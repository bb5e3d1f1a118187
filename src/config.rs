//! Runtime configuration loaded from the environment.

use std::env;
use std::time::Duration;

use tracing::info;

use crate::rate_limit::limiter::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const MIN_ADMIN_TOKEN_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub site_url: String,
    pub admin_email: String,
    pub admin_api_token: String,
    pub email_from: String,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let admin_email = get("ADMIN_EMAIL").ok_or(ConfigError::Missing("ADMIN_EMAIL"))?;
        if !crate::forms::is_valid_email(&admin_email) {
            return Err(ConfigError::Invalid {
                key: "ADMIN_EMAIL",
                reason: "not an email address".to_string(),
            });
        }

        let admin_api_token =
            get("ADMIN_API_TOKEN").ok_or(ConfigError::Missing("ADMIN_API_TOKEN"))?;
        if admin_api_token.len() < MIN_ADMIN_TOKEN_LEN {
            return Err(ConfigError::Invalid {
                key: "ADMIN_API_TOKEN",
                reason: format!("must be at least {MIN_ADMIN_TOKEN_LEN} characters"),
            });
        }

        let site_url = get("SITE_URL")
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let email_from = match get("EMAIL_FROM") {
            Some(from) => from,
            None => format!("no-reply@{}", host_of(&site_url)),
        };

        let rate_limit_max = match get("RATE_LIMIT_MAX") {
            Some(raw) => parse_positive("RATE_LIMIT_MAX", &raw)?,
            None => DEFAULT_MAX_REQUESTS,
        };

        let rate_limit_window = match get("RATE_LIMIT_WINDOW") {
            Some(raw) => Duration::from_secs(parse_positive("RATE_LIMIT_WINDOW", &raw)?.into()),
            None => DEFAULT_WINDOW,
        };

        Ok(Self {
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            site_url,
            admin_email,
            admin_api_token,
            email_from,
            rate_limit_max,
            rate_limit_window,
        })
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}

/// Host part of a URL, e.g. `shop.example.ca` for `https://shop.example.ca:8443/x`.
fn host_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = without_scheme.split('/').next().unwrap_or(without_scheme);
    authority.split(':').next().unwrap_or(authority)
}
