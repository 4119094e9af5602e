//! Configuration handling for mlongo.
//!
//! The command-line router produces one immutable [`Config`] per invocation.
//! It holds everything needed to reach the server; the per-command fields
//! (collection, field, order, index name) travel on [`crate::models::Command`].

use crate::error::{DbError, DbResult};
use clap::ValueEnum;
use std::time::Duration;
use url::Url;

pub const URI_SCHEME: &str = "mongodb";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 4;
pub const DEFAULT_MAX_TIME_SECS: u64 = 2;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const REDACTED_PASSWORD: &str = "****";

/// How results and errors are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per item
    #[default]
    Text,
    /// A single JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Connection and runtime settings for one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Appended to the URI path when set; also the authentication database.
    pub database: Option<String>,
    pub username: Option<String>,
    /// Sensitive - never logged
    pub password: Option<String>,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Server-side time limit for list-indexes and drop-index, in seconds
    pub max_time: u64,
    pub format: OutputFormat,
    pub log_level: String,
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: None,
            username: None,
            password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_time: DEFAULT_MAX_TIME_SECS,
            format: OutputFormat::Text,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }

    /// Username, treating an empty string as absent.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Database, treating an empty string as absent.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref().filter(|d| !d.is_empty())
    }

    /// Build `mongodb://[user[:pass]@]host:port[/database]`.
    ///
    /// Credentials are omitted entirely when no username is set, and are
    /// percent-encoded otherwise.
    pub fn connection_string(&self) -> DbResult<String> {
        self.build_uri(self.password.as_deref())
    }

    /// Same as [`Config::connection_string`] with the password masked, for logs.
    pub fn redacted_connection_string(&self) -> DbResult<String> {
        let masked = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|_| REDACTED_PASSWORD);
        self.build_uri(masked)
    }

    fn build_uri(&self, password: Option<&str>) -> DbResult<String> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(DbError::usage("host must not be empty"));
        }

        // Bare IPv6 literals need brackets before a port can follow.
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };

        let mut url = Url::parse(&format!("{}://{}:{}", URI_SCHEME, host, self.port))
            .map_err(|e| DbError::usage(format!("invalid host '{}': {}", self.host, e)))?;

        if let Some(username) = self.username() {
            url.set_username(username)
                .map_err(|_| DbError::usage(format!("invalid username '{}'", username)))?;
            url.set_password(password.filter(|p| !p.is_empty()))
                .map_err(|_| DbError::usage("invalid password"))?;
        }

        if let Some(database) = self.database() {
            url.set_path(&format!("/{}", database));
        }

        Ok(url.to_string())
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Get the per-operation time limit as a Duration.
    pub fn max_time_duration(&self) -> Duration {
        Duration::from_secs(self.max_time)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| REDACTED_PASSWORD))
            .field("connect_timeout", &self.connect_timeout)
            .field("max_time", &self.max_time)
            .field("format", &self.format)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}
