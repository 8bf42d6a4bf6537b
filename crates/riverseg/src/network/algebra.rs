//! Derived queries over a [`Network`]: reversal, boundary classification and
//! reachability.
//!
//! # Boundary nodes
//!
//! | Term      | Definition |
//! |-----------|------------|
//! | headwater | key that is never a target (no upstream contributor) |
//! | tailwater | target that is not a key, or key with no targets |
//! | junction  | node appearing as a target more than once |
//!
//! # Reachability
//!
//! [`reachable`] runs one breadth-first walk per source over downstream
//! edges. Walks use an explicit queue and a visited set, so long chains and
//! malformed cyclic inputs both terminate in O(V+E) per source.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, instrument, warn};

use super::{Network, NodeId};
use crate::error::NetworkError;

/// Reverse every edge: node → upstream contributors.
///
/// Every key of `network` is a key of the result, as is every target, so
/// both networks share the same node set.
#[must_use]
pub fn reverse_network<K: NodeId>(network: &Network<K>) -> Network<K> {
    let mut reversed = Network::new();
    for (src, dsts) in network.iter() {
        reversed.insert_node(src.clone());
        for dst in dsts {
            reversed.add_edge(dst.clone(), src.clone());
        }
    }
    reversed
}

/// Nodes fed by more than one upstream edge.
#[must_use]
pub fn junctions<K: NodeId>(network: &Network<K>) -> BTreeSet<K> {
    let mut counts: BTreeMap<&K, usize> = BTreeMap::new();
    for (_, dst) in network.edges() {
        *counts.entry(dst).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(node, _)| node.clone())
        .collect()
}

/// Keys that never appear as a target.
#[must_use]
pub fn headwaters<K: NodeId>(network: &Network<K>) -> BTreeSet<K> {
    let targets: BTreeSet<&K> = network.edges().map(|(_, dst)| dst).collect();
    network
        .keys()
        .filter(|key| !targets.contains(key))
        .cloned()
        .collect()
}

/// Outlets: targets outside the keyed domain plus keys with no targets.
#[must_use]
pub fn tailwaters<K: NodeId>(network: &Network<K>) -> BTreeSet<K> {
    let mut tails: BTreeSet<K> = network
        .edges()
        .map(|(_, dst)| dst)
        .filter(|dst| !network.contains_key(dst))
        .cloned()
        .collect();
    tails.extend(
        network
            .iter()
            .filter(|(_, dsts)| dsts.is_empty())
            .map(|(node, _)| node.clone()),
    );
    tails
}

/// Nodes reachable downstream from each source.
///
/// `sources` defaults to [`headwaters`]. A node listed in `targets` is
/// included in the reach set but its successors are not explored. Each
/// reach set contains its own source.
#[must_use]
pub fn reachable<K: NodeId>(
    network: &Network<K>,
    sources: Option<&[K]>,
    targets: Option<&[K]>,
) -> BTreeMap<K, BTreeSet<K>> {
    let sources: Vec<K> = match sources {
        Some(sources) => sources.to_vec(),
        None => headwaters(network).into_iter().collect(),
    };
    let stops: BTreeSet<&K> = targets.map(|t| t.iter().collect()).unwrap_or_default();

    let mut reached = BTreeMap::new();
    for source in sources {
        let mut reach: BTreeSet<K> = BTreeSet::from([source.clone()]);
        let mut queue: VecDeque<&K> = VecDeque::new();

        if !stops.contains(&source) {
            queue.extend(network.targets(&source));
        }
        while let Some(node) = queue.pop_front() {
            if !reach.insert(node.clone()) {
                continue;
            }
            if !stops.contains(node) {
                queue.extend(network.targets(node));
            }
        }

        reached.insert(source, reach);
    }
    reached
}

/// Per-source induced sub-networks over the reach sets of [`reachable`].
///
/// # Errors
///
/// With `check_disjoint`, returns [`NetworkError::PartitionOverlap`] when two
/// sources reach a common node; overlapping partitions cannot be processed
/// independently.
#[instrument(skip_all, fields(nodes = network.len(), check_disjoint = check_disjoint))]
pub fn reachable_network<K: NodeId>(
    network: &Network<K>,
    sources: Option<&[K]>,
    targets: Option<&[K]>,
    check_disjoint: bool,
) -> Result<BTreeMap<K, Network<K>>, NetworkError> {
    let reached = reachable(network, sources, targets);

    if check_disjoint {
        let mut owner: BTreeMap<&K, &K> = BTreeMap::new();
        for (source, reach) in &reached {
            for node in reach {
                let Some(previous) = owner.insert(node, source) else {
                    continue;
                };
                let shared: Vec<String> = reached[previous]
                    .intersection(reach)
                    .map(|n| format!("{n:?}"))
                    .collect();
                warn!(
                    first = ?previous,
                    second = ?source,
                    shared = shared.len(),
                    "reach sets overlap"
                );
                return Err(NetworkError::PartitionOverlap {
                    first: format!("{previous:?}"),
                    second: format!("{source:?}"),
                    shared,
                });
            }
        }
    }

    debug!(partitions = reached.len(), "built reachable sub-networks");
    Ok(reached
        .into_iter()
        .map(|(source, reach)| {
            let sub = network.restrict(&reach);
            (source, sub)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
