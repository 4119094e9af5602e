//! Typed commands produced by the argument router.

use crate::models::IndexSpec;
use serde::Serialize;

/// The single operation an invocation performs.
///
/// Each variant carries only the fields its operation needs; the connection
/// settings live in [`crate::config::Config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ListDatabases,
    ListCollections {
        database: String,
    },
    /// `collection: None` lists the indexes of every collection.
    ListIndexes {
        database: String,
        collection: Option<String>,
    },
    CreateIndex {
        database: String,
        collection: String,
        spec: IndexSpec,
    },
    DropIndex {
        database: String,
        collection: String,
        name: String,
    },
}

impl Command {
    /// Human-readable operation name used in logs and error messages.
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::ListDatabases => "list databases",
            Self::ListCollections { .. } => "list collections",
            Self::ListIndexes { .. } => "list indexes",
            Self::CreateIndex { .. } => "create index",
            Self::DropIndex { .. } => "drop index",
        }
    }

    /// Database the command targets, if any.
    pub fn database(&self) -> Option<&str> {
        match self {
            Self::ListDatabases => None,
            Self::ListCollections { database }
            | Self::ListIndexes { database, .. }
            | Self::CreateIndex { database, .. }
            | Self::DropIndex { database, .. } => Some(database),
        }
    }
}
