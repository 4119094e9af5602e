//! Error types for mlongo.
//!
//! This module defines all error types using `thiserror`. Every variant is
//! terminal for the invocation: the message is printed and the process exits
//! with a non-zero status.

use mongodb::error::ErrorKind;
use thiserror::Error;

/// Exit status for a successful invocation.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status for any failed invocation.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("{message}")]
    Usage { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("{operation} failed: {message}")]
    Operation {
        operation: String,
        message: String,
        /// Server error name, e.g. "IndexNotFound"
        code_name: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a usage error (bad flags, unknown sub-command).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an operation error relaying the server's message.
    pub fn operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        code_name: Option<String>,
    ) -> Self {
        Self::Operation {
            operation: operation.into(),
            message: message.into(),
            code_name,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify a driver error raised while running `operation`.
    ///
    /// Errors that mean the server could not be reached or refused the
    /// credentials become `Connection`; everything else is relayed as an
    /// `Operation` error with the server's text.
    pub fn from_driver(operation: &str, err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Authentication { message, .. } => DbError::connection(
                format!("authentication failed: {}", message),
                "Check the username, password and database",
            ),
            ErrorKind::ServerSelection { message, .. } => DbError::connection(
                message.clone(),
                "Check that the server is running and reachable at host:port",
            ),
            ErrorKind::DnsResolve { message, .. } => DbError::connection(
                format!("DNS resolution failed: {}", message),
                "Check the host name",
            ),
            ErrorKind::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            ErrorKind::Command(cmd) => DbError::operation(
                operation,
                cmd.message.clone(),
                Some(cmd.code_name.clone()).filter(|name| !name.is_empty()),
            ),
            _ => DbError::operation(operation, err.to_string(), None),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Usage { .. } => Some("Run with --help to see the available commands"),
            Self::Operation {
                code_name: Some(code),
                ..
            } => match code.as_str() {
                "IndexNotFound" => Some("List the existing indexes with `mlongo index list`"),
                "DuplicateKey" => {
                    Some("Remove duplicate values of the field before creating a unique index")
                }
                "Unauthorized" => Some("The user lacks the privileges for this operation"),
                _ => None,
            },
            _ => None,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Usage { .. } => "usage",
            Self::Connection { .. } => "connection",
            Self::Operation { .. } => "operation",
            Self::Internal { .. } => "internal",
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

impl From<mongodb::error::Error> for DbError {
    fn from(err: mongodb::error::Error) -> Self {
        DbError::from_driver("request", err)
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::internal(format!("failed to write output: {}", err))
    }
}

/// Result type alias for mlongo operations.
pub type DbResult<T> = Result<T, DbError>;
