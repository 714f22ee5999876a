//! Connection settings for the `PostgreSQL` task store.

use super::store::TaskPgPool;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the database URL.
pub const DATABASE_URL_VAR: &str = "TASKLIST_DATABASE_URL";
/// Environment variable holding the maximum pool size.
pub const POOL_SIZE_VAR: &str = "TASKLIST_DB_POOL_SIZE";
/// Environment variable holding the connection timeout in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "TASKLIST_DB_CONNECT_TIMEOUT_SECS";

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading settings or building the pool.
#[derive(Debug, Error)]
pub enum StoreConfigError {
    /// A required variable is not set.
    #[error("missing required setting {0}")]
    MissingVariable(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value '{value}' for {variable}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Raw value found.
        value: String,
    },

    /// The connection pool could not be created.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// Settings for [`super::PostgresTaskStore`] connection pooling.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tasklist::task::adapters::postgres::PostgresStoreConfig;
///
/// let config = PostgresStoreConfig::new("postgres://localhost/todos")
///     .with_max_pool_size(4)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_pool_size(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresStoreConfig {
    database_url: String,
    max_pool_size: u32,
    connection_timeout: Duration,
}

impl PostgresStoreConfig {
    /// Creates settings for `database_url` with default pool limits.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreConfigError::MissingVariable`] when the database URL is
    /// unset, or [`StoreConfigError::InvalidValue`] for unparsable numbers.
    pub fn from_env() -> Result<Self, StoreConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(StoreConfigError::MissingVariable(DATABASE_URL_VAR))?;
        let max_pool_size = parse_or(&lookup, POOL_SIZE_VAR, DEFAULT_POOL_SIZE)?;
        let timeout_secs = parse_or(&lookup, CONNECT_TIMEOUT_VAR, DEFAULT_CONNECT_TIMEOUT_SECS)?;

        Ok(Self {
            database_url,
            max_pool_size,
            connection_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Sets the maximum number of pooled connections.
    #[must_use]
    pub const fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Sets how long to wait for a pooled connection.
    #[must_use]
    pub const fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Returns the database URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum pool size.
    #[must_use]
    pub const fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Builds an r2d2 pool from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreConfigError::Pool`] when the initial connections cannot
    /// be established.
    pub fn build_pool(&self) -> Result<TaskPgPool, StoreConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(self.database_url.as_str());
        let pool = Pool::builder()
            .max_size(self.max_pool_size)
            .connection_timeout(self.connection_timeout)
            .build(manager)?;
        Ok(pool)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    variable: &'static str,
    default: T,
) -> Result<T, StoreConfigError> {
    match lookup(variable) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| StoreConfigError::InvalidValue { variable, value }),
    }
}
