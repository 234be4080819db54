//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the Folio API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `AUTH_MAX_FAILED_ATTEMPTS`: Failures before an account locks (default: 5)
//! - `AUTH_LOCKOUT_MINUTES`: Length of a lockout (default: 15)
//! - `AUTH_SESSION_TTL_DAYS`: Session lifetime (default: 7)
//! - `AUTH_HASH_MEMORY_KIB`, `AUTH_HASH_ITERATIONS`, `AUTH_HASH_PARALLELISM`:
//!   Argon2 work factor (defaults: 19456, 2, 1)

use std::env;
use std::str::FromStr;

use chrono::Duration;
use eyre::{eyre, Result, WrapErr};
use tracing::Level;

use crate::auth::{AuthPolicy, HashParams};

/// Configuration for the Folio API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use folio_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Lockout, session and hashing settings
    pub auth: AuthConfig,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - Any numeric variable is set but cannot be parsed
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("API_PORT", 3000)?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = log_level_from_env();

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Performance settings
        let request_timeout = env_or("API_REQUEST_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            auth: AuthConfig::from_env()?,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// One year.
const MAX_LOCKOUT_MINUTES: i64 = 525_600;
const MAX_SESSION_TTL_DAYS: i64 = 3_650;

/// Authentication settings. Defaults are the production values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub max_failed_attempts: u32,
    pub lockout_minutes: i64,
    pub session_ttl_days: i64,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let policy = AuthPolicy::default();
        let hash = HashParams::default();
        Self {
            max_failed_attempts: policy.max_failed_attempts,
            lockout_minutes: policy.lockout.num_minutes(),
            session_ttl_days: policy.session_ttl.num_days(),
            hash_memory_kib: hash.memory_kib,
            hash_iterations: hash.iterations,
            hash_parallelism: hash.parallelism,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            max_failed_attempts: env_or("AUTH_MAX_FAILED_ATTEMPTS", defaults.max_failed_attempts)?,
            lockout_minutes: env_or("AUTH_LOCKOUT_MINUTES", defaults.lockout_minutes)?,
            session_ttl_days: env_or("AUTH_SESSION_TTL_DAYS", defaults.session_ttl_days)?,
            hash_memory_kib: env_or("AUTH_HASH_MEMORY_KIB", defaults.hash_memory_kib)?,
            hash_iterations: env_or("AUTH_HASH_ITERATIONS", defaults.hash_iterations)?,
            hash_parallelism: env_or("AUTH_HASH_PARALLELISM", defaults.hash_parallelism)?,
        };
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_failed_attempts == 0 {
            return Err(eyre!("AUTH_MAX_FAILED_ATTEMPTS must be at least 1"));
        }
        if !(1..=MAX_LOCKOUT_MINUTES).contains(&self.lockout_minutes) {
            return Err(eyre!(
                "AUTH_LOCKOUT_MINUTES must be between 1 and {}",
                MAX_LOCKOUT_MINUTES
            ));
        }
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&self.session_ttl_days) {
            return Err(eyre!(
                "AUTH_SESSION_TTL_DAYS must be between 1 and {}",
                MAX_SESSION_TTL_DAYS
            ));
        }
        Ok(())
    }

    /// Builds the lockout and session rules, rejecting out-of-range values.
    pub fn policy(&self) -> Result<AuthPolicy> {
        self.validate()?;

        Ok(AuthPolicy {
            max_failed_attempts: self.max_failed_attempts,
            lockout: Duration::minutes(self.lockout_minutes),
            session_ttl: Duration::days(self.session_ttl_days),
        })
    }

    pub fn hash_params(&self) -> HashParams {
        HashParams {
            memory_kib: self.hash_memory_kib,
            iterations: self.hash_iterations,
            parallelism: self.hash_parallelism,
        }
    }
}

/// Reads `LOG_LEVEL`, falling back to INFO for anything unrecognised.
pub fn log_level_from_env() -> Level {
    match env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid {} value", key)),
        Err(_) => Ok(default),
    }
}
