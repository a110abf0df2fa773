//! Labeled-property graph with secondary indices and uniqueness constraints
//!
//! This is the single-threaded core of [`MemoryGraph`](crate::MemoryGraph).
//! All methods take `&mut self`; locking happens one level up.
//!
//! # Atomicity
//!
//! Every mutating primitive validates declared constraints before touching
//! any state, so a primitive either applies completely or fails without
//! effect. Statement handlers order their primitives so that the ones that
//! can fail run first, which gives each statement the all-or-nothing
//! behaviour of a real graph store. Batches get no such guarantee.
//!
//! # Statistics
//!
//! Mutating primitives take a `&mut QueryStats` and record what they changed.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use finstrument_core::Relation;
use finstrument_executor::{Error, QueryStats, Result};

use crate::index::{LabelIndex, PropertyIndex};

/// Node identifier, allocated monotonically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Relationship identifier, allocated monotonically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelId(pub u64);

/// A node: labels, properties and the relationships touching it
#[derive(Debug, Clone, Default)]
pub struct Node {
    labels: BTreeSet<String>,
    props: Map<String, Value>,
    rels: SmallVec<[RelId; 4]>,
}

impl Node {
    /// Labels carried by this node
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    /// Property bag
    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    /// True if the node carries `label`
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// String value of `key`, if present and a string
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

/// A directed, typed relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship type
    pub kind: Relation,
    /// Start node
    pub from: NodeId,
    /// End node
    pub to: NodeId,
}

/// The graph itself
#[derive(Debug, Default)]
pub struct Graph {
    nodes: FxHashMap<NodeId, Node>,
    rels: FxHashMap<RelId, Relationship>,
    labels: LabelIndex,
    properties: PropertyIndex,
    constraints: BTreeSet<(String, String)>,
    indexes: BTreeSet<(String, String)>,
    next_node: u64,
    next_rel: u64,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Schema ==========

    /// Declare a uniqueness constraint; idempotent
    ///
    /// Fails if existing data already violates it.
    pub fn add_constraint(&mut self, label: &str, property: &str) -> Result<()> {
        let key = (label.to_string(), property.to_string());
        if self.constraints.contains(&key) {
            return Ok(());
        }
        let mut seen = BTreeSet::new();
        for id in self.labels.nodes(label) {
            if let Some(value) = self.nodes.get(&id).and_then(|n| n.str_prop(property)) {
                if !seen.insert(value) {
                    return Err(Error::ConstraintViolation {
                        label: label.to_string(),
                        property: property.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        self.constraints.insert(key);
        Ok(())
    }

    /// Declare a lookup index; idempotent
    ///
    /// All string properties are indexed already, so this only records the
    /// declaration.
    pub fn add_index(&mut self, label: &str, property: &str) {
        self.indexes.insert((label.to_string(), property.to_string()));
    }

    /// Declared uniqueness constraints
    pub fn constraints(&self) -> &BTreeSet<(String, String)> {
        &self.constraints
    }

    /// Declared indexes
    pub fn indexes(&self) -> &BTreeSet<(String, String)> {
        &self.indexes
    }

    /// Check that a node `id` (or a new node, if `None`) carrying `labels`
    /// and `props` would not collide with another node
    pub fn check_unique<'a>(
        &self,
        id: Option<NodeId>,
        labels: impl IntoIterator<Item = &'a str>,
        props: &Map<String, Value>,
    ) -> Result<()> {
        for label in labels {
            for (c_label, c_prop) in &self.constraints {
                if c_label != label {
                    continue;
                }
                let Some(value) = props.get(c_prop).and_then(Value::as_str) else {
                    continue;
                };
                let clash = self
                    .properties
                    .lookup(c_prop, value)
                    .into_iter()
                    .filter(|other| Some(*other) != id)
                    .any(|other| self.nodes.get(&other).is_some_and(|n| n.has_label(label)));
                if clash {
                    return Err(Error::ConstraintViolation {
                        label: label.to_string(),
                        property: c_prop.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    // ========== Reads ==========

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Relationship by id
    pub fn rel(&self, id: RelId) -> Option<&Relationship> {
        self.rels.get(&id)
    }

    /// Nodes carrying `label` with string `property = value`, in id order
    pub fn find_nodes(&self, label: &str, property: &str, value: &str) -> Vec<NodeId> {
        self.properties
            .lookup(property, value)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.has_label(label)))
            .collect()
    }

    /// First node carrying `label` with string `property = value`
    pub fn find_node(&self, label: &str, property: &str, value: &str) -> Option<NodeId> {
        self.find_nodes(label, property, value).into_iter().next()
    }

    /// Nodes carrying `label`, in creation order
    pub fn label_scan(&self, label: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.labels.nodes(label)
    }

    /// Number of nodes carrying `label`
    pub fn label_count(&self, label: &str) -> usize {
        self.labels.count(label)
    }

    /// Total node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total relationship count
    pub fn rel_count(&self) -> usize {
        self.rels.len()
    }

    /// Any node id, lowest first
    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes.keys().min().copied()
    }

    /// Number of relationships touching `id` in either direction
    pub fn degree(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map_or(0, |n| n.rels.len())
    }

    /// Relationships of `kind` leaving `id`, with their end nodes
    pub fn outgoing(&self, id: NodeId, kind: Relation) -> Vec<(RelId, NodeId)> {
        self.touching(id)
            .filter(|(_, r)| r.kind == kind && r.from == id)
            .map(|(rid, r)| (rid, r.to))
            .collect()
    }

    /// Relationships of `kind` entering `id`, with their start nodes
    pub fn incoming(&self, id: NodeId, kind: Relation) -> Vec<(RelId, NodeId)> {
        self.touching(id)
            .filter(|(_, r)| r.kind == kind && r.to == id)
            .map(|(rid, r)| (rid, r.from))
            .collect()
    }

    fn touching(&self, id: NodeId) -> impl Iterator<Item = (RelId, Relationship)> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.rels.iter())
            .filter_map(move |rid| self.rels.get(rid).map(|r| (*rid, *r)))
    }

    // ========== Node mutations ==========

    /// Create a node
    pub fn create_node(
        &mut self,
        labels: &[&str],
        props: Map<String, Value>,
        stats: &mut QueryStats,
    ) -> Result<NodeId> {
        self.check_unique(None, labels.iter().copied(), &props)?;

        self.next_node += 1;
        let id = NodeId(self.next_node);
        for label in labels {
            self.labels.insert(label, id);
        }
        for (key, value) in &props {
            if let Some(s) = value.as_str() {
                self.properties.insert(key, s, id);
            }
        }
        stats.nodes_created += 1;
        stats.labels_added += labels.len() as u64;
        stats.properties_set += props.len() as u64;
        self.nodes.insert(
            id,
            Node {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                props,
                rels: SmallVec::new(),
            },
        );
        Ok(id)
    }

    /// Find the node carrying `label` with `property = value`, creating it
    /// with just that label and property if there is none
    pub fn merge_node(
        &mut self,
        label: &str,
        property: &str,
        value: &str,
        stats: &mut QueryStats,
    ) -> Result<NodeId> {
        if let Some(id) = self.find_node(label, property, value) {
            return Ok(id);
        }
        let mut props = Map::new();
        props.insert(property.to_string(), Value::from(value));
        self.create_node(&[label], props, stats)
    }

    /// Add `label` to a node; no-op if already present
    pub fn add_label(&mut self, id: NodeId, label: &str, stats: &mut QueryStats) -> Result<()> {
        let Some(node) = self.nodes.get(&id) else {
            return Ok(());
        };
        if node.has_label(label) {
            return Ok(());
        }
        self.check_unique(Some(id), [label], &node.props)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.labels.insert(label.to_string());
        }
        self.labels.insert(label, id);
        stats.labels_added += 1;
        Ok(())
    }

    /// Remove `label` from a node; returns whether it was present
    pub fn remove_label(&mut self, id: NodeId, label: &str, stats: &mut QueryStats) -> bool {
        let removed = self
            .nodes
            .get_mut(&id)
            .is_some_and(|n| n.labels.remove(label));
        if removed {
            self.labels.remove(label, id);
            stats.labels_removed += 1;
        }
        removed
    }

    /// Replace a node's property bag wholesale
    ///
    /// Counts one property write per key set plus one per key removed.
    pub fn replace_props(
        &mut self,
        id: NodeId,
        props: Map<String, Value>,
        stats: &mut QueryStats,
    ) -> Result<()> {
        let Some(node) = self.nodes.get(&id) else {
            return Ok(());
        };
        self.check_unique(Some(id), node.labels.iter().map(String::as_str), &props)?;

        let old = match self.nodes.get_mut(&id) {
            Some(node) => std::mem::take(&mut node.props),
            None => return Ok(()),
        };
        let removed = old.keys().filter(|k| !props.contains_key(*k)).count();
        for (key, value) in &old {
            if let Some(s) = value.as_str() {
                self.properties.remove(key, s, id);
            }
        }
        for (key, value) in &props {
            if let Some(s) = value.as_str() {
                self.properties.insert(key, s, id);
            }
        }
        stats.properties_set += (props.len() + removed) as u64;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.props = props;
        }
        Ok(())
    }

    /// Delete a node together with every relationship touching it
    pub fn detach_delete(&mut self, id: NodeId, stats: &mut QueryStats) {
        let rels: Vec<RelId> = match self.nodes.get(&id) {
            Some(node) => node.rels.to_vec(),
            None => return,
        };
        for rid in rels {
            self.delete_rel(rid, stats);
        }
        if let Some(node) = self.nodes.remove(&id) {
            for label in &node.labels {
                self.labels.remove(label, id);
            }
            for (key, value) in &node.props {
                if let Some(s) = value.as_str() {
                    self.properties.remove(key, s, id);
                }
            }
            stats.nodes_deleted += 1;
        }
    }

    // ========== Relationship mutations ==========

    /// Create a relationship
    pub fn create_rel(
        &mut self,
        kind: Relation,
        from: NodeId,
        to: NodeId,
        stats: &mut QueryStats,
    ) -> Result<RelId> {
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return Err(Error::InvalidParameter {
                reason: format!("{} endpoint does not exist", kind),
            });
        }
        self.next_rel += 1;
        let rid = RelId(self.next_rel);
        self.rels.insert(rid, Relationship { kind, from, to });
        if let Some(node) = self.nodes.get_mut(&from) {
            node.rels.push(rid);
        }
        if from != to {
            if let Some(node) = self.nodes.get_mut(&to) {
                node.rels.push(rid);
            }
        }
        stats.relationships_created += 1;
        Ok(rid)
    }

    /// Find a `kind` relationship from `from` to `to`, creating it if absent
    pub fn merge_rel(
        &mut self,
        kind: Relation,
        from: NodeId,
        to: NodeId,
        stats: &mut QueryStats,
    ) -> Result<RelId> {
        match self
            .outgoing(from, kind)
            .into_iter()
            .find(|(_, end)| *end == to)
        {
            Some((rid, _)) => Ok(rid),
            None => self.create_rel(kind, from, to, stats),
        }
    }

    /// Delete a relationship; no-op if it is already gone
    pub fn delete_rel(&mut self, rid: RelId, stats: &mut QueryStats) {
        let Some(rel) = self.rels.remove(&rid) else {
            return;
        };
        for end in [rel.from, rel.to] {
            if let Some(node) = self.nodes.get_mut(&end) {
                node.rels.retain(|r| *r != rid);
            }
        }
        stats.relationships_deleted += 1;
    }
}
