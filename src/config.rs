use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

use crate::cors::DEFAULT_ALLOWED_ORIGINS;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: Option<DatabaseConfig>,
    pub smtp: SmtpConfig,
    pub allowed_origins: Vec<String>,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Authenticated system address used as the envelope sender.
    pub from: String,
    /// Mailbox that receives the notifications.
    pub to: String,
    pub site_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Implicit TLS from the first byte (port 465).
    Tls,
    StartTls,
    /// Plaintext, for local mail catchers.
    None,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database = match lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                connect_timeout: Duration::from_secs(parse(
                    "DATABASE_CONNECT_TIMEOUT_SECS",
                    &env_or("DATABASE_CONNECT_TIMEOUT_SECS", "10"),
                )?),
            }),
            None => None,
        };

        let tls = if env_or("EMAIL_SECURE", "false") == "true" {
            SmtpTls::Tls
        } else if env_or("EMAIL_STARTTLS", "true") == "false" {
            SmtpTls::None
        } else {
            SmtpTls::StartTls
        };

        let user = lookup("EMAIL_USER").filter(|v| !v.is_empty());
        let from = lookup("EMAIL_FROM")
            .filter(|v| !v.is_empty())
            .or_else(|| user.clone())
            .ok_or(ConfigError::Missing("EMAIL_FROM"))?;
        let to = lookup("CONTACT_EMAIL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("CONTACT_EMAIL"))?;

        let smtp = SmtpConfig {
            host: env_or("EMAIL_HOST", "smtp.gmail.com"),
            port: parse("EMAIL_PORT", &env_or("EMAIL_PORT", "587"))?,
            tls,
            user,
            pass: lookup("EMAIL_PASS").filter(|v| !v.is_empty()),
            from,
            to,
            site_name: env_or("CONTACT_SITE_NAME", "Website"),
            timeout: Duration::from_secs(parse(
                "EMAIL_TIMEOUT_SECS",
                &env_or("EMAIL_TIMEOUT_SECS", "8"),
            )?),
        };

        let allowed_origins = parse_origins(lookup("CONTACT_CORS_ORIGINS"));

        Ok(Config {
            database,
            smtp,
            allowed_origins,
            host: parse("CONTACT_HOST", &env_or("CONTACT_HOST", "0.0.0.0"))?,
            port: parse("PORT", &env_or("PORT", "5000"))?,
            max_body_size: parse(
                "CONTACT_MAX_BODY_SIZE",
                &env_or("CONTACT_MAX_BODY_SIZE", "65536"),
            )?,
            log_level: env_or("CONTACT_LOG_LEVEL", "info"),
        })
    }
}

/// Allow-list from `CONTACT_CORS_ORIGINS`, falling back to the built-in origins.
pub fn allowed_origins_from_env() -> Vec<String> {
    parse_origins(std::env::var("CONTACT_CORS_ORIGINS").ok())
}

fn parse_origins(value: Option<String>) -> Vec<String> {
    match value {
        Some(list) if !list.trim().is_empty() => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
