//! Kahn's-algorithm ordering for node- and segment-level networks.
//!
//! The ready set is ordered, so among nodes that become ready together the
//! smallest id is emitted first and results are deterministic. Degree tables
//! are owned by each call.
//!
//! A network with a cycle never yields a truncated success: the lazy
//! [`KahnIter`] ends with an `Err(CycleDetected)` item and the eager helpers
//! return that error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};

use super::cycles::cycle_error;
use crate::error::NetworkError;
use crate::network::{Network, NodeId};

/// Lazy topological order over a network.
pub struct KahnIter<'a, K> {
    network: &'a Network<K>,
    degrees: BTreeMap<K, usize>,
    ready: BTreeSet<K>,
    done: bool,
}

impl<'a, K: NodeId> KahnIter<'a, K> {
    #[must_use]
    pub fn new(network: &'a Network<K>) -> Self {
        let degrees = network.in_degrees();
        let ready = degrees
            .iter()
            .filter(|&(_, degree)| *degree == 0)
            .map(|(node, _)| node.clone())
            .collect();
        Self {
            network,
            degrees,
            ready,
            done: false,
        }
    }
}

impl<K: NodeId> Iterator for KahnIter<'_, K> {
    type Item = Result<K, NetworkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(node) = self.ready.pop_first() {
            for target in self.network.targets(&node) {
                if let Some(degree) = self.degrees.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        self.ready.insert(target.clone());
                    }
                }
            }
            return Some(Ok(node));
        }

        self.done = true;
        let unscheduled: BTreeSet<K> = self
            .degrees
            .iter()
            .filter(|&(_, degree)| *degree > 0)
            .map(|(node, _)| node.clone())
            .collect();
        if unscheduled.is_empty() {
            None
        } else {
            Some(Err(cycle_error(self.network, &unscheduled)))
        }
    }
}

/// Every node, each before all nodes downstream of it.
///
/// # Errors
///
/// Returns [`NetworkError::CycleDetected`] if the network has a cycle.
#[instrument(skip_all, fields(nodes = network.len()))]
pub fn kahn_toposort<K: NodeId>(network: &Network<K>) -> Result<Vec<K>, NetworkError> {
    let order: Vec<K> = KahnIter::new(network).collect::<Result<_, _>>()?;
    debug!(ordered = order.len(), "topological order computed");
    Ok(order)
}

/// Every edge `(n, m)`, grouped by source in topological order of sources.
///
/// # Errors
///
/// Returns [`NetworkError::CycleDetected`] if the network has a cycle.
pub fn kahn_toposort_edges<K: NodeId>(network: &Network<K>) -> Result<Vec<(K, K)>, NetworkError> {
    let order = kahn_toposort(network)?;
    Ok(order
        .iter()
        .flat_map(|n| network.targets(n).iter().map(move |m| (n.clone(), m.clone())))
        .collect())
}

/// Group nodes into levels that can run in parallel.
///
/// Level 0 holds the headwaters; a node is placed in the level after its
/// last upstream neighbor's level. Each level is sorted.
///
/// # Errors
///
/// Returns [`NetworkError::CycleDetected`] if the network has a cycle.
#[instrument(skip_all, fields(nodes = network.len()))]
pub fn kahn_wavefronts<K: NodeId>(network: &Network<K>) -> Result<Vec<Vec<K>>, NetworkError> {
    let mut degrees = network.in_degrees();
    let mut wave: Vec<K> = degrees
        .iter()
        .filter(|&(_, degree)| *degree == 0)
        .map(|(node, _)| node.clone())
        .collect();

    let mut waves: Vec<Vec<K>> = Vec::new();
    let mut scheduled = 0usize;
    while !wave.is_empty() {
        let mut next: BTreeSet<K> = BTreeSet::new();
        for node in &wave {
            for target in network.targets(node) {
                if let Some(degree) = degrees.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.insert(target.clone());
                    }
                }
            }
        }
        scheduled += wave.len();
        waves.push(wave);
        wave = next.into_iter().collect();
    }

    if scheduled < degrees.len() {
        let unscheduled: BTreeSet<K> = degrees
            .into_iter()
            .filter(|&(_, degree)| degree > 0)
            .map(|(node, _)| node)
            .collect();
        return Err(cycle_error(network, &unscheduled));
    }

    debug!(waves = waves.len(), scheduled, "wavefronts computed");
    Ok(waves)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
