//! Operation dispatch.
//!
//! Runs exactly one [`Command`] against a [`MongoAdmin`] and returns the
//! [`Outcome`] for the printer.

use crate::db::MongoAdmin;
use crate::error::DbResult;
use crate::models::{CollectionIndexes, Command, IndexSpec};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Successful result of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Databases {
        databases: Vec<String>,
    },
    Collections {
        database: String,
        collections: Vec<String>,
    },
    /// Empty `collections` when the database has none.
    Indexes {
        database: String,
        collections: Vec<CollectionIndexes>,
    },
    IndexCreated {
        database: String,
        collection: String,
        name: String,
    },
    IndexDropped {
        database: String,
        collection: String,
        name: String,
    },
}

/// Dispatches commands to the server through a [`MongoAdmin`].
#[derive(Debug)]
pub struct OperationDispatcher<'a, A> {
    admin: &'a A,
    max_time: Duration,
}

impl<'a, A: MongoAdmin> OperationDispatcher<'a, A> {
    pub fn new(admin: &'a A, max_time: Duration) -> Self {
        Self { admin, max_time }
    }

    /// Run `command`. Server errors are returned as-is; nothing is retried.
    pub async fn dispatch(&self, command: &Command) -> DbResult<Outcome> {
        info!(
            operation = command.operation_name(),
            database = command.database().unwrap_or(""),
            "Dispatching command"
        );

        match command {
            Command::ListDatabases => self.list_databases().await,
            Command::ListCollections { database } => self.list_collections(database).await,
            Command::ListIndexes {
                database,
                collection,
            } => self.list_indexes(database, collection.as_deref()).await,
            Command::CreateIndex {
                database,
                collection,
                spec,
            } => self.create_index(database, collection, spec).await,
            Command::DropIndex {
                database,
                collection,
                name,
            } => self.drop_index(database, collection, name).await,
        }
    }

    async fn list_databases(&self) -> DbResult<Outcome> {
        let databases = self.admin.list_databases().await?;
        Ok(Outcome::Databases { databases })
    }

    async fn list_collections(&self, database: &str) -> DbResult<Outcome> {
        let collections = self.admin.list_collections(database).await?;
        Ok(Outcome::Collections {
            database: database.to_string(),
            collections,
        })
    }

    async fn list_indexes(&self, database: &str, only: Option<&str>) -> DbResult<Outcome> {
        let names = match only {
            Some(collection) => vec![collection.to_string()],
            None => self.admin.list_collections(database).await?,
        };

        let mut collections = Vec::with_capacity(names.len());
        for collection in names {
            let indexes = self
                .admin
                .list_indexes(database, &collection, self.max_time)
                .await?;
            collections.push(CollectionIndexes {
                collection,
                indexes,
            });
        }

        Ok(Outcome::Indexes {
            database: database.to_string(),
            collections,
        })
    }

    async fn create_index(
        &self,
        database: &str,
        collection: &str,
        spec: &IndexSpec,
    ) -> DbResult<Outcome> {
        debug!(
            collection,
            field = %spec.field,
            order = %spec.order,
            unique = spec.unique,
            "Creating index"
        );
        let name = self.admin.create_index(database, collection, spec).await?;
        info!(collection, index = %name, "Index created");
        Ok(Outcome::IndexCreated {
            database: database.to_string(),
            collection: collection.to_string(),
            name,
        })
    }

    async fn drop_index(&self, database: &str, collection: &str, name: &str) -> DbResult<Outcome> {
        self.admin
            .drop_index(database, collection, name, self.max_time)
            .await?;
        info!(collection, index = name, "Index dropped");
        Ok(Outcome::IndexDropped {
            database: database.to_string(),
            collection: collection.to_string(),
            name: name.to_string(),
        })
    }
}
