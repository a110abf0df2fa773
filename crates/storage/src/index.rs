//! Secondary indices for efficient graph lookups
//!
//! This module provides secondary indices that let statements find nodes
//! without scanning the whole node table:
//! - LabelIndex: Maps label → ordered set of NodeIds (also defines store order)
//! - PropertyIndex: Maps (property, string value) → set of NodeIds

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

use crate::graph::NodeId;

/// Secondary index: label → NodeIds
///
/// Node ids are allocated monotonically, so iterating a label's set yields
/// nodes in creation order. Paginated label scans rely on this being stable
/// while the data does not change.
#[derive(Debug, Default)]
pub struct LabelIndex {
    index: FxHashMap<String, BTreeSet<NodeId>>,
}

impl LabelIndex {
    /// Create a new empty LabelIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node to label's index
    pub fn insert(&mut self, label: &str, node: NodeId) {
        self.index.entry(label.to_string()).or_default().insert(node);
    }

    /// Remove node from label's index
    ///
    /// Empty sets are dropped to avoid accumulating dead labels.
    pub fn remove(&mut self, label: &str, node: NodeId) {
        if let Some(nodes) = self.index.get_mut(label) {
            nodes.remove(&node);
            if nodes.is_empty() {
                self.index.remove(label);
            }
        }
    }

    /// Nodes carrying `label`, in creation order
    pub fn nodes(&self, label: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.index.get(label).into_iter().flatten().copied()
    }

    /// Number of nodes carrying `label`
    pub fn count(&self, label: &str) -> usize {
        self.index.get(label).map_or(0, BTreeSet::len)
    }
}

/// Secondary index: (property, string value) → NodeIds
///
/// Only string-valued properties are indexed; every property the instrument
/// store looks nodes up by (`uuid`, `value`) is a string.
#[derive(Debug, Default)]
pub struct PropertyIndex {
    index: FxHashMap<String, FxHashMap<String, FxHashSet<NodeId>>>,
}

impl PropertyIndex {
    /// Create a new empty PropertyIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` has `property = value`
    pub fn insert(&mut self, property: &str, value: &str, node: NodeId) {
        self.index
            .entry(property.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(node);
    }

    /// Forget that `node` has `property = value`
    pub fn remove(&mut self, property: &str, value: &str, node: NodeId) {
        if let Some(values) = self.index.get_mut(property) {
            if let Some(nodes) = values.get_mut(value) {
                nodes.remove(&node);
                if nodes.is_empty() {
                    values.remove(value);
                }
            }
            if values.is_empty() {
                self.index.remove(property);
            }
        }
    }

    /// Nodes with `property = value`, in ascending id order
    pub fn lookup(&self, property: &str, value: &str) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .index
            .get(property)
            .and_then(|values| values.get(value))
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default();
        nodes.sort_unstable();
        nodes
    }
}
