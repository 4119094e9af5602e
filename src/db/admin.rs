//! Metadata operations against a MongoDB deployment.

use crate::db::MongoSession;
use crate::error::{DbError, DbResult};
use crate::models::{IndexSpec, IndexSummary};
use futures_util::TryStreamExt;
use mongodb::IndexModel;
use mongodb::bson::Document;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// The metadata requests the dispatcher needs from the server.
///
/// Implementations relay server failures as [`DbError`] and never retry.
pub trait MongoAdmin {
    /// Names of all databases (names-only listing).
    fn list_databases(&self) -> impl Future<Output = DbResult<Vec<String>>> + Send;

    /// Names of the collections of `database`.
    fn list_collections(
        &self,
        database: &str,
    ) -> impl Future<Output = DbResult<Vec<String>>> + Send;

    /// Index descriptors of one collection, bounded by `max_time` on the server.
    fn list_indexes(
        &self,
        database: &str,
        collection: &str,
        max_time: Duration,
    ) -> impl Future<Output = DbResult<Vec<IndexSummary>>> + Send;

    /// Create one index and return the name the server assigned.
    fn create_index(
        &self,
        database: &str,
        collection: &str,
        spec: &IndexSpec,
    ) -> impl Future<Output = DbResult<String>> + Send;

    /// Drop the index called `name`, bounded by `max_time` on the server.
    fn drop_index(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        max_time: Duration,
    ) -> impl Future<Output = DbResult<()>> + Send;
}

impl MongoAdmin for MongoSession {
    async fn list_databases(&self) -> DbResult<Vec<String>> {
        self.client
            .list_database_names()
            .await
            .map_err(|e| DbError::from_driver("list databases", e))
    }

    async fn list_collections(&self, database: &str) -> DbResult<Vec<String>> {
        self.client
            .database(database)
            .list_collection_names()
            .await
            .map_err(|e| DbError::from_driver("list collections", e))
    }

    async fn list_indexes(
        &self,
        database: &str,
        collection: &str,
        max_time: Duration,
    ) -> DbResult<Vec<IndexSummary>> {
        let coll = self
            .client
            .database(database)
            .collection::<Document>(collection);
        let cursor = coll
            .list_indexes()
            .max_time(max_time)
            .await
            .map_err(|e| DbError::from_driver("list indexes", e))?;
        let models: Vec<IndexModel> = cursor
            .try_collect()
            .await
            .map_err(|e| DbError::from_driver("list indexes", e))?;

        debug!(collection, count = models.len(), "Listed indexes");
        Ok(models.iter().map(IndexSummary::from_model).collect())
    }

    async fn create_index(
        &self,
        database: &str,
        collection: &str,
        spec: &IndexSpec,
    ) -> DbResult<String> {
        let coll = self
            .client
            .database(database)
            .collection::<Document>(collection);
        let result = coll
            .create_index(spec.to_model())
            .await
            .map_err(|e| DbError::from_driver("create index", e))?;
        Ok(result.index_name)
    }

    async fn drop_index(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        max_time: Duration,
    ) -> DbResult<()> {
        let coll = self
            .client
            .database(database)
            .collection::<Document>(collection);
        coll.drop_index(name)
            .max_time(max_time)
            .await
            .map_err(|e| DbError::from_driver("drop index", e))
    }
}
