//! Index-related data models.
//!
//! This module defines the sort order, the creation request and the summary
//! reported for each listed index.

use mongodb::IndexModel;
use mongodb::bson::{Bson, Document};
use mongodb::options::IndexOptions;
use serde::Serialize;
use std::str::FromStr;

/// Sort direction of a single-field index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexOrder {
    Ascending,
    Descending,
}

impl IndexOrder {
    /// Direction value stored in the index key document.
    pub fn direction(&self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }

    /// Command-line token for this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl FromStr for IndexOrder {
    type Err = String;

    /// Only the exact tokens `asc` and `desc` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(format!(
                "invalid order type '{}' (expected 'asc' or 'desc')",
                other
            )),
        }
    }
}

impl std::fmt::Display for IndexOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to create a single-field index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSpec {
    pub field: String,
    pub order: IndexOrder,
    pub unique: bool,
}

impl IndexSpec {
    pub fn new(field: impl Into<String>, order: IndexOrder, unique: bool) -> Self {
        Self {
            field: field.into(),
            order,
            unique,
        }
    }

    /// Key document mapping the field to its direction, e.g. `{ email: 1 }`.
    pub fn keys(&self) -> Document {
        let mut keys = Document::new();
        keys.insert(self.field.clone(), self.order.direction());
        keys
    }

    /// Index options; `None` when no option is requested.
    pub fn options(&self) -> Option<IndexOptions> {
        self.unique
            .then(|| IndexOptions::builder().unique(true).build())
    }

    /// Build the driver index model submitted to `createIndexes`.
    pub fn to_model(&self) -> IndexModel {
        IndexModel::builder()
            .keys(self.keys())
            .options(self.options())
            .build()
    }
}

/// Name and uniqueness of an existing index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    pub name: String,
    pub unique: bool,
    /// Key document rendered as JSON
    pub keys: serde_json::Value,
}

impl IndexSummary {
    pub fn new(name: impl Into<String>, unique: bool, keys: &Document) -> Self {
        Self {
            name: name.into(),
            unique,
            keys: serde_json::to_value(keys).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Extract the summary from a listed index descriptor.
    ///
    /// A missing `unique` option means the index is not unique.
    pub fn from_model(model: &IndexModel) -> Self {
        let options = model.options.as_ref();
        let name = options
            .and_then(|o| o.name.clone())
            .unwrap_or_else(|| default_index_name(&model.keys));
        let unique = options.and_then(|o| o.unique).unwrap_or(false);
        Self::new(name, unique, &model.keys)
    }
}

/// Name the server assigns when none is given: `field_direction` pairs joined by `_`.
pub fn default_index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, value)| {
            let direction = match value {
                Bson::Int32(n) => n.to_string(),
                Bson::Int64(n) => n.to_string(),
                Bson::Double(n) => n.to_string(),
                Bson::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}_{}", field, direction)
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// Indexes of one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionIndexes {
    pub collection: String,
    pub indexes: Vec<IndexSummary>,
}
