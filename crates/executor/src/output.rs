//! Results of statement execution.
//!
//! Every statement in a batch yields exactly one [`StatementResult`]: the rows
//! it returned (possibly none) and the update statistics it produced. Rows are
//! JSON objects keyed by the column names of the rendered Cypher, so callers
//! decode them the same way regardless of which executor ran the batch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// One result row keyed by column name
pub type Row = Map<String, Value>;

/// Update statistics of one statement
///
/// Mirrors the counters a Neo4j-compatible store reports per statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Nodes created
    pub nodes_created: u64,
    /// Nodes deleted
    pub nodes_deleted: u64,
    /// Relationships created
    pub relationships_created: u64,
    /// Relationships deleted
    pub relationships_deleted: u64,
    /// Property writes (including removals)
    pub properties_set: u64,
    /// Labels added to nodes
    pub labels_added: u64,
    /// Labels removed from nodes
    pub labels_removed: u64,
}

impl QueryStats {
    /// True if the statement changed anything
    pub fn contains_updates(&self) -> bool {
        self.nodes_created
            + self.nodes_deleted
            + self.relationships_created
            + self.relationships_deleted
            + self.properties_set
            + self.labels_added
            + self.labels_removed
            > 0
    }
}

/// Rows and statistics produced by one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    /// Returned rows in store order
    pub rows: Vec<Row>,
    /// Update statistics
    pub stats: QueryStats,
}

impl StatementResult {
    /// Result with no rows
    pub fn empty(stats: QueryStats) -> Self {
        Self {
            rows: Vec::new(),
            stats,
        }
    }

    /// Decode every row into `T`
    pub fn decode_rows<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.rows
            .iter()
            .map(|row| serde_json::from_value(Value::Object(row.clone())).map_err(Error::from))
            .collect()
    }

    /// Decode the first row into `T`, if there is one
    pub fn decode_first<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.rows
            .first()
            .map(|row| serde_json::from_value(Value::Object(row.clone())).map_err(Error::from))
            .transpose()
    }
}
