//! Adjacency model for directed river networks.
//!
//! # Overview
//!
//! A [`Network`] maps every reach to the ordered list of reaches it drains
//! into. Edges point **downstream**: `A → B` means water leaving `A` enters
//! `B`. Most reaches have exactly one target; diversions (more than one
//! target) are representable but not enforced away.
//!
//! ## Implicit leaves
//!
//! A node that only ever appears as a target is an *implicit leaf*. It has no
//! adjacency entry but is still a node: [`Network::nodes`] yields it,
//! [`Network::targets`] returns an empty slice for it, and every traversal in
//! this crate visits it. Absent keys are never an error.
//!
//! ## Submodules
//!
//! - [`extract`]: build a network from a route-link table.
//! - [`algebra`]: reversal, boundary classification, reachability.

pub mod algebra;
pub mod extract;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use petgraph::graph::{DiGraph, NodeIndex};

pub use algebra::{
    headwaters, junctions, reachable, reachable_network, reverse_network, tailwaters,
};
pub use extract::{RouteLinks, extract_connections};

/// Key type accepted for reach identifiers.
///
/// Ordering is required so every derived structure iterates
/// deterministically; `Debug` is used to render ids in errors and hashes.
pub trait NodeId: Clone + Ord + Hash + fmt::Debug {}

impl<T: Clone + Ord + Hash + fmt::Debug> NodeId for T {}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A directed network: node → ordered downstream targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network<K> {
    adjacency: BTreeMap<K, Vec<K>>,
}

impl<K> Default for Network<K> {
    fn default() -> Self {
        Self {
            adjacency: BTreeMap::new(),
        }
    }
}

impl<K: NodeId> Network<K> {
    /// Create an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `node` has an adjacency entry (empty if new).
    pub fn insert_node(&mut self, node: K) {
        self.adjacency.entry(node).or_default();
    }

    /// Append `dst` to the target list of `src`, creating `src` if needed.
    ///
    /// `dst` is not given an entry of its own; until it is inserted as a key
    /// it is an implicit leaf.
    pub fn add_edge(&mut self, src: K, dst: K) {
        self.adjacency.entry(src).or_default().push(dst);
    }

    /// Downstream targets of `node`. Absent keys have no targets.
    #[must_use]
    pub fn targets(&self, node: &K) -> &[K] {
        self.adjacency.get(node).map_or(&[], Vec::as_slice)
    }

    /// Whether `node` has an explicit adjacency entry.
    #[must_use]
    pub fn contains_key(&self, node: &K) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Whether `node` is a key or a target anywhere in the network.
    #[must_use]
    pub fn contains_node(&self, node: &K) -> bool {
        self.contains_key(node) || self.adjacency.values().flatten().any(|t| t == node)
    }

    /// Nodes with an explicit adjacency entry, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.adjacency.keys()
    }

    /// `(node, targets)` for every explicit entry, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[K])> {
        self.adjacency.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of explicit adjacency entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Every node: keys first, then implicit leaves in first-seen order.
    ///
    /// No node is yielded twice.
    pub fn nodes(&self) -> impl Iterator<Item = &K> {
        let mut seen: BTreeSet<&K> = BTreeSet::new();
        self.adjacency.keys().chain(
            self.adjacency
                .values()
                .flatten()
                .filter(move |v| !self.adjacency.contains_key(*v) && seen.insert(*v)),
        )
    }

    /// Number of distinct nodes including implicit leaves.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// `(source, target)` pairs in key order, then target-list order.
    pub fn edges(&self) -> impl Iterator<Item = (&K, &K)> {
        self.adjacency
            .iter()
            .flat_map(|(src, dsts)| dsts.iter().map(move |dst| (src, dst)))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Incoming edge count for every node; headwaters map to 0.
    #[must_use]
    pub fn in_degrees(&self) -> BTreeMap<K, usize> {
        let mut degrees: BTreeMap<K, usize> = BTreeMap::new();
        for (_, dst) in self.edges() {
            *degrees.entry(dst.clone()).or_insert(0) += 1;
        }
        for head in algebra::headwaters(self) {
            degrees.entry(head).or_insert(0);
        }
        degrees
    }

    /// Downstream edge count for every node: the in-degrees of the
    /// reversed network.
    #[must_use]
    pub fn out_degrees(&self) -> BTreeMap<K, usize> {
        algebra::reverse_network(self).in_degrees()
    }

    /// Induced sub-network: each node in `nodes` mapped to its original
    /// (possibly empty) target list.
    #[must_use]
    pub fn restrict(&self, nodes: &BTreeSet<K>) -> Self {
        nodes
            .iter()
            .map(|node| (node.clone(), self.targets(node).to_vec()))
            .collect()
    }

    /// BLAKE3 hash of the adjacency, used to tag derived plans.
    ///
    /// Independent of insertion order of keys; sensitive to target order.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (src, dsts) in &self.adjacency {
            hasher.update(format!("{src:?}").as_bytes());
            hasher.update(b"\x00");
            for dst in dsts {
                hasher.update(format!("{dst:?}").as_bytes());
                hasher.update(b"\x01");
            }
            hasher.update(b"\x02");
        }
        format!("blake3:{}", hasher.finalize())
    }

    /// Export to a petgraph [`DiGraph`], including implicit leaves.
    #[must_use]
    pub fn to_digraph(&self) -> NetworkGraph<K> {
        let mut graph = DiGraph::<K, ()>::with_capacity(self.len(), self.edge_count());
        let mut node_map: HashMap<K, NodeIndex> = HashMap::with_capacity(self.len());

        for node in self.nodes() {
            let idx = graph.add_node(node.clone());
            node_map.insert(node.clone(), idx);
        }
        for (src, dst) in self.edges() {
            graph.add_edge(node_map[src], node_map[dst], ());
        }

        NetworkGraph { graph, node_map }
    }
}

impl<K: NodeId> FromIterator<(K, Vec<K>)> for Network<K> {
    /// Repeated keys extend the existing target list.
    fn from_iter<I: IntoIterator<Item = (K, Vec<K>)>>(iter: I) -> Self {
        let mut network = Self::new();
        for (src, dsts) in iter {
            network.adjacency.entry(src).or_default().extend(dsts);
        }
        network
    }
}

impl<K: NodeId, const N: usize> From<[(K, Vec<K>); N]> for Network<K> {
    fn from(entries: [(K, Vec<K>); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// A petgraph view of a [`Network`].
#[derive(Debug)]
pub struct NetworkGraph<K> {
    pub graph: DiGraph<K, ()>,
    /// Mapping from node id to petgraph `NodeIndex`.
    pub node_map: HashMap<K, NodeIndex>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
