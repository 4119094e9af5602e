//! Integration tests for operation dispatch.
//!
//! These tests run every command against an in-memory `MongoAdmin` and check
//! the outcome, the printed output and the exit status.

use mlongo::DbError;
use mlongo::app::report;
use mlongo::config::OutputFormat;
use mlongo::db::MongoAdmin;
use mlongo::error::DbResult;
use mlongo::models::{
    CollectionIndexes, Command, IndexOrder, IndexSpec, IndexSummary, default_index_name,
};
use mlongo::tools::{OperationDispatcher, Outcome};
use mongodb::bson::doc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

const MAX_TIME: Duration = Duration::from_secs(2);

/// Database name -> collection name -> indexes.
type Catalog = BTreeMap<String, BTreeMap<String, Vec<IndexSummary>>>;

#[derive(Default)]
struct FakeServer {
    catalog: Mutex<Catalog>,
    /// (collection, field) pairs holding duplicate values
    duplicates: HashSet<(String, String)>,
    /// Every max_time passed to list/drop
    max_times: Mutex<Vec<Duration>>,
}

impl FakeServer {
    fn with_collection(self, database: &str, collection: &str) -> Self {
        self.catalog
            .lock()
            .unwrap()
            .entry(database.to_string())
            .or_default()
            .insert(
                collection.to_string(),
                vec![IndexSummary::new("_id_", false, &doc! { "_id": 1 })],
            );
        self
    }

    fn with_duplicates(mut self, collection: &str, field: &str) -> Self {
        self.duplicates
            .insert((collection.to_string(), field.to_string()));
        self
    }

    fn index_names(&self, database: &str, collection: &str) -> Vec<String> {
        self.catalog.lock().unwrap()[database][collection]
            .iter()
            .map(|i| i.name.clone())
            .collect()
    }
}

fn namespace_not_found(operation: &str, database: &str, collection: &str) -> DbError {
    DbError::operation(
        operation,
        format!("ns does not exist: {}.{}", database, collection),
        Some("NamespaceNotFound".to_string()),
    )
}

impl MongoAdmin for FakeServer {
    async fn list_databases(&self) -> DbResult<Vec<String>> {
        Ok(self.catalog.lock().unwrap().keys().cloned().collect())
    }

    async fn list_collections(&self, database: &str) -> DbResult<Vec<String>> {
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .get(database)
            .map(|colls| colls.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_indexes(
        &self,
        database: &str,
        collection: &str,
        max_time: Duration,
    ) -> DbResult<Vec<IndexSummary>> {
        self.max_times.lock().unwrap().push(max_time);
        self.catalog
            .lock()
            .unwrap()
            .get(database)
            .and_then(|colls| colls.get(collection))
            .cloned()
            .ok_or_else(|| namespace_not_found("list indexes", database, collection))
    }

    async fn create_index(
        &self,
        database: &str,
        collection: &str,
        spec: &IndexSpec,
    ) -> DbResult<String> {
        if spec.unique
            && self
                .duplicates
                .contains(&(collection.to_string(), spec.field.clone()))
        {
            return Err(DbError::operation(
                "create index",
                format!("E11000 duplicate key error collection: {}.{}", database, collection),
                Some("DuplicateKey".to_string()),
            ));
        }

        let keys = spec.keys();
        let name = default_index_name(&keys);
        let mut catalog = self.catalog.lock().unwrap();
        let indexes = catalog
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_insert_with(|| vec![IndexSummary::new("_id_", false, &doc! { "_id": 1 })]);
        indexes.push(IndexSummary::new(name.clone(), spec.unique, &keys));
        Ok(name)
    }

    async fn drop_index(
        &self,
        database: &str,
        collection: &str,
        name: &str,
        max_time: Duration,
    ) -> DbResult<()> {
        self.max_times.lock().unwrap().push(max_time);
        let mut catalog = self.catalog.lock().unwrap();
        let indexes = catalog
            .get_mut(database)
            .and_then(|colls| colls.get_mut(collection))
            .ok_or_else(|| namespace_not_found("drop index", database, collection))?;
        let position = indexes.iter().position(|i| i.name == name).ok_or_else(|| {
            DbError::operation(
                "drop index",
                format!("index not found with name [{}]", name),
                Some("IndexNotFound".to_string()),
            )
        })?;
        indexes.remove(position);
        Ok(())
    }
}

async fn dispatch(server: &FakeServer, command: Command) -> DbResult<Outcome> {
    OperationDispatcher::new(server, MAX_TIME)
        .dispatch(&command)
        .await
}

fn printed(result: DbResult<Outcome>) -> (u8, String) {
    let mut buffer = Vec::new();
    let code = report(&mut buffer, result, OutputFormat::Text);
    (code, String::from_utf8(buffer).unwrap())
}

/// Test listing database names.
#[tokio::test]
async fn test_list_databases() {
    let server = FakeServer::default()
        .with_collection("admin", "system.version")
        .with_collection("shop", "users");

    let outcome = dispatch(&server, Command::ListDatabases).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Databases {
            databases: vec!["admin".into(), "shop".into()]
        }
    );

    let (code, text) = printed(Ok(outcome));
    assert_eq!(code, 0);
    assert_eq!(text, "databases:\n- admin\n- shop\n");
}

/// Test listing collection names.
#[tokio::test]
async fn test_list_collections() {
    let server = FakeServer::default()
        .with_collection("shop", "orders")
        .with_collection("shop", "users");

    let outcome = dispatch(
        &server,
        Command::ListCollections {
            database: "shop".into(),
        },
    )
    .await
    .unwrap();

    let (code, text) = printed(Ok(outcome));
    assert_eq!(code, 0);
    assert_eq!(text, "collections in database shop:\n- orders\n- users\n");
}

/// Test that creating a unique ascending index reports the server's name.
#[tokio::test]
async fn test_create_unique_index() {
    let server = FakeServer::default().with_collection("shop", "users");
    let spec = IndexSpec::new("email", IndexOrder::Ascending, true);
    assert_eq!(spec.keys(), doc! { "email": 1 });

    let outcome = dispatch(
        &server,
        Command::CreateIndex {
            database: "shop".into(),
            collection: "users".into(),
            spec,
        },
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        Outcome::IndexCreated {
            database: "shop".into(),
            collection: "users".into(),
            name: "email_1".into(),
        }
    );
    assert_eq!(server.index_names("shop", "users"), ["_id_", "email_1"]);

    let (code, text) = printed(Ok(outcome));
    assert_eq!(code, 0);
    assert!(text.contains("email_1"));
}

/// Test that a descending index gets the -1 direction.
#[tokio::test]
async fn test_create_descending_index() {
    let server = FakeServer::default().with_collection("shop", "events");
    let outcome = dispatch(
        &server,
        Command::CreateIndex {
            database: "shop".into(),
            collection: "events".into(),
            spec: IndexSpec::new("created_at", IndexOrder::Descending, false),
        },
    )
    .await
    .unwrap();

    match outcome {
        Outcome::IndexCreated { name, .. } => assert_eq!(name, "created_at_-1"),
        other => panic!("unexpected outcome {:?}", other),
    }
}

/// Test that a duplicate-key rejection is relayed as an operation error.
#[tokio::test]
async fn test_create_unique_index_with_duplicates() {
    let server = FakeServer::default()
        .with_collection("shop", "users")
        .with_duplicates("users", "email");

    let result = dispatch(
        &server,
        Command::CreateIndex {
            database: "shop".into(),
            collection: "users".into(),
            spec: IndexSpec::new("email", IndexOrder::Ascending, true),
        },
    )
    .await;

    assert!(matches!(result, Err(DbError::Operation { .. })));
    assert_eq!(server.index_names("shop", "users"), ["_id_"]);

    let (code, text) = printed(result);
    assert_eq!(code, 1);
    assert!(text.contains("E11000"));
    assert!(text.contains("hint:"));
}

/// Test dropping an existing index.
#[tokio::test]
async fn test_drop_index() {
    let server = FakeServer::default().with_collection("shop", "users");
    dispatch(
        &server,
        Command::CreateIndex {
            database: "shop".into(),
            collection: "users".into(),
            spec: IndexSpec::new("email", IndexOrder::Ascending, false),
        },
    )
    .await
    .unwrap();

    let outcome = dispatch(
        &server,
        Command::DropIndex {
            database: "shop".into(),
            collection: "users".into(),
            name: "email_1".into(),
        },
    )
    .await
    .unwrap();

    assert_eq!(server.index_names("shop", "users"), ["_id_"]);
    assert_eq!(*server.max_times.lock().unwrap(), [MAX_TIME]);

    let (code, text) = printed(Ok(outcome));
    assert_eq!(code, 0);
    assert_eq!(text, "index dropped: email_1 (collection users)\n");
}

/// Test that dropping an unknown index fails and leaves other indexes alone.
#[tokio::test]
async fn test_drop_unknown_index() {
    let server = FakeServer::default().with_collection("shop", "users");
    dispatch(
        &server,
        Command::CreateIndex {
            database: "shop".into(),
            collection: "users".into(),
            spec: IndexSpec::new("email", IndexOrder::Ascending, true),
        },
    )
    .await
    .unwrap();

    let result = dispatch(
        &server,
        Command::DropIndex {
            database: "shop".into(),
            collection: "users".into(),
            name: "missing_1".into(),
        },
    )
    .await;

    match &result {
        Err(DbError::Operation { code_name, .. }) => {
            assert_eq!(code_name.as_deref(), Some("IndexNotFound"))
        }
        other => panic!("expected operation error, got {:?}", other),
    }
    assert_eq!(server.index_names("shop", "users"), ["_id_", "email_1"]);

    let (code, text) = printed(result);
    assert_eq!(code, 1);
    assert!(text.starts_with("error: drop index failed: index not found"));
}

/// Test listing indexes of every collection.
#[tokio::test]
async fn test_list_indexes_all_collections() {
    let server = FakeServer::default()
        .with_collection("shop", "orders")
        .with_collection("shop", "users");
    dispatch(
        &server,
        Command::CreateIndex {
            database: "shop".into(),
            collection: "users".into(),
            spec: IndexSpec::new("email", IndexOrder::Ascending, true),
        },
    )
    .await
    .unwrap();

    let outcome = dispatch(
        &server,
        Command::ListIndexes {
            database: "shop".into(),
            collection: None,
        },
    )
    .await
    .unwrap();

    match &outcome {
        Outcome::Indexes { collections, .. } => {
            let names: Vec<&str> = collections.iter().map(|c| c.collection.as_str()).collect();
            assert_eq!(names, ["orders", "users"]);
            assert!(collections[1].indexes[1].unique);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(server.max_times.lock().unwrap().len(), 2);

    let (code, text) = printed(Ok(outcome));
    assert_eq!(code, 0);
    assert!(text.contains("- email_1 | unique = true"));
    assert!(text.contains("- _id_ | unique = false"));
}

/// Test listing indexes of a single collection.
#[tokio::test]
async fn test_list_indexes_single_collection() {
    let server = FakeServer::default()
        .with_collection("shop", "orders")
        .with_collection("shop", "users");

    let outcome = dispatch(
        &server,
        Command::ListIndexes {
            database: "shop".into(),
            collection: Some("users".into()),
        },
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        Outcome::Indexes {
            database: "shop".into(),
            collections: vec![CollectionIndexes {
                collection: "users".into(),
                indexes: vec![IndexSummary::new("_id_", false, &doc! { "_id": 1 })],
            }],
        }
    );
}

/// Test that an empty database lists no indexes and still succeeds.
#[tokio::test]
async fn test_list_indexes_empty_database() {
    let server = FakeServer::default();

    let outcome = dispatch(
        &server,
        Command::ListIndexes {
            database: "empty".into(),
            collection: None,
        },
    )
    .await
    .unwrap();

    let (code, text) = printed(Ok(outcome));
    assert_eq!(code, 0);
    assert!(text.is_empty());
    assert!(server.max_times.lock().unwrap().is_empty());
}

/// Test that a failure on one collection aborts the listing.
#[tokio::test]
async fn test_list_indexes_unknown_collection() {
    let server = FakeServer::default().with_collection("shop", "users");

    let result = dispatch(
        &server,
        Command::ListIndexes {
            database: "shop".into(),
            collection: Some("ghosts".into()),
        },
    )
    .await;

    let (code, text) = printed(result);
    assert_eq!(code, 1);
    assert!(text.contains("ns does not exist"));
}

/// Test JSON output of a created index.
#[tokio::test]
async fn test_json_report() {
    let server = FakeServer::default().with_collection("shop", "users");
    let result = dispatch(
        &server,
        Command::CreateIndex {
            database: "shop".into(),
            collection: "users".into(),
            spec: IndexSpec::new("email", IndexOrder::Ascending, true),
        },
    )
    .await;

    let mut buffer = Vec::new();
    let code = report(&mut buffer, result, OutputFormat::Json);
    assert_eq!(code, 0);

    let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    assert_eq!(value["result"], "index_created");
    assert_eq!(value["name"], "email_1");
}
