//! MemoryGraph: in-process graph store behind the collaborator contracts
//!
//! Implements [`BatchExecutor`] and [`IndexManager`] over a [`Graph`] guarded
//! by a `parking_lot::RwLock`.
//!
//! # Batch Semantics
//!
//! - Statements run in order, each under its own lock acquisition. Batches
//!   issued concurrently may therefore interleave between statements, just
//!   as they can against a remote store.
//! - Each statement is all-or-nothing. The batch is not: on failure the
//!   statements already applied stay applied.
//!
//! # Fault Injection
//!
//! Tests can take the store offline with [`MemoryGraph::set_available`] or
//! make the next batch fail at a chosen statement with
//! [`MemoryGraph::fail_next_batch_at`].

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, warn};

use finstrument_core::{Classification, IdentifierScheme, UUID_PROPERTY};
use finstrument_executor::{BatchExecutor, Error, IndexManager, Result, Statement, StatementResult};

use crate::graph::Graph;
use crate::handlers;

#[derive(Debug)]
struct Fault {
    at: usize,
    reason: String,
}

/// In-process labeled-property graph store
///
/// # Example
///
/// ```
/// use finstrument_executor::{BatchExecutor, Statement};
/// use finstrument_storage::MemoryGraph;
///
/// let graph = MemoryGraph::new();
/// let results = graph.execute_batch(&[Statement::CountInstruments]).unwrap();
/// assert_eq!(results[0].rows[0]["count"], 0);
/// ```
#[derive(Debug)]
pub struct MemoryGraph {
    graph: RwLock<Graph>,
    available: AtomicBool,
    fault: Mutex<Option<Fault>>,
    batches: AtomicU64,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    /// Create an empty, available store
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(Graph::new()),
            available: AtomicBool::new(true),
            fault: Mutex::new(None),
            batches: AtomicU64::new(0),
        }
    }

    // ========== Fault injection ==========

    /// Take the store offline (`false`) or bring it back (`true`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make the next batch fail when it reaches statement `index`
    ///
    /// Statements before `index` are applied normally.
    pub fn fail_next_batch_at(&self, index: usize, reason: impl Into<String>) {
        *self.fault.lock() = Some(Fault {
            at: index,
            reason: reason.into(),
        });
    }

    /// Number of batches that reached the store
    pub fn batches_executed(&self) -> u64 {
        self.batches.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Unavailable {
                reason: "memory graph is offline".to_string(),
            })
        }
    }

    // ========== Inspection ==========

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.read().node_count()
    }

    /// Total number of relationships
    pub fn relationship_count(&self) -> usize {
        self.graph.read().rel_count()
    }

    /// Number of `Thing` nodes whose uuid is `uuid`
    pub fn nodes_with_uuid(&self, uuid: &str) -> usize {
        self.graph
            .read()
            .find_nodes(Classification::Thing.label(), UUID_PROPERTY, uuid)
            .len()
    }

    /// Labels of the `Thing` node with `uuid`
    pub fn labels_of(&self, uuid: &str) -> Option<BTreeSet<String>> {
        let graph = self.graph.read();
        let id = graph.find_node(Classification::Thing.label(), UUID_PROPERTY, uuid)?;
        graph.node(id).map(|n| n.labels().clone())
    }

    /// Property bag of the `Thing` node with `uuid`
    pub fn properties_of(&self, uuid: &str) -> Option<Map<String, Value>> {
        let graph = self.graph.read();
        let id = graph.find_node(Classification::Thing.label(), UUID_PROPERTY, uuid)?;
        graph.node(id).map(|n| n.props().clone())
    }

    /// Number of identifier nodes of `scheme`
    pub fn identifier_count(&self, scheme: IdentifierScheme) -> usize {
        self.graph.read().label_count(scheme.label())
    }

    /// Declared uniqueness constraints as (label, property) pairs
    pub fn constraints(&self) -> Vec<(String, String)> {
        self.graph.read().constraints().iter().cloned().collect()
    }

    /// Declared indexes as (label, property) pairs
    pub fn indexes(&self) -> Vec<(String, String)> {
        self.graph.read().indexes().iter().cloned().collect()
    }
}

impl BatchExecutor for MemoryGraph {
    fn execute_batch(&self, statements: &[Statement]) -> Result<Vec<StatementResult>> {
        self.ensure_available()?;
        self.batches.fetch_add(1, Ordering::SeqCst);
        let fault = self.fault.lock().take();

        let mut results = Vec::with_capacity(statements.len());
        for (index, statement) in statements.iter().enumerate() {
            if let Some(fault) = fault.as_ref().filter(|f| f.at == index) {
                warn!(
                    target: "finstrument::graph",
                    index,
                    statement = statement.name(),
                    "Injected statement failure"
                );
                return Err(Error::StatementFailed {
                    index,
                    reason: fault.reason.clone(),
                });
            }
            let result = if statement.is_write() {
                handlers::apply(&mut self.graph.write(), statement)
            } else {
                handlers::query(&self.graph.read(), statement)
            };
            match result {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(
                        target: "finstrument::graph",
                        index,
                        statement = statement.name(),
                        error = %e,
                        "Statement failed; earlier statements in the batch remain applied"
                    );
                    return Err(e);
                }
            }
        }

        debug!(
            target: "finstrument::graph",
            statements = statements.len(),
            "Batch executed"
        );
        Ok(results)
    }
}

impl IndexManager for MemoryGraph {
    fn ensure_indexes(&self, indexes: &BTreeMap<&str, &str>) -> Result<()> {
        self.ensure_available()?;
        let mut graph = self.graph.write();
        for (label, property) in indexes {
            graph.add_index(label, property);
        }
        Ok(())
    }

    fn ensure_constraints(&self, constraints: &BTreeMap<&str, &str>) -> Result<()> {
        self.ensure_available()?;
        let mut graph = self.graph.write();
        for (label, property) in constraints {
            graph.add_constraint(label, property)?;
        }
        Ok(())
    }
}
