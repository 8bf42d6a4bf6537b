//! Cycle reporting for networks that cannot be ordered.
//!
//! A river network should be acyclic; a cycle means the route-link table is
//! corrupt. When Kahn's algorithm stalls, the unscheduled nodes include
//! every cycle plus everything downstream of one. Tarjan's SCC over that
//! remainder isolates the actual loops for the error report.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeSet;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::warn;

use crate::error::NetworkError;
use crate::network::{Network, NodeId};

/// Find all cycles currently present in `network`.
///
/// Each entry is a sorted list of the members of one strongly connected
/// component. Self-loops are reported as a one-element cycle. Entries are
/// sorted.
#[must_use]
pub fn find_cycles<K: NodeId>(network: &Network<K>) -> Vec<Vec<K>> {
    let view = network.to_digraph();
    let graph = &view.graph;

    let mut cycles: Vec<Vec<K>> = tarjan_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || component.first().is_some_and(|node| has_self_loop(graph, *node))
        })
        .map(|component| {
            let mut ids: Vec<K> = component
                .into_iter()
                .filter_map(|idx| graph.node_weight(idx).cloned())
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

fn has_self_loop<K>(graph: &DiGraph<K, ()>, node: NodeIndex) -> bool {
    graph.find_edge(node, node).is_some()
}

/// Build the [`NetworkError::CycleDetected`] for nodes Kahn could not order.
pub(crate) fn cycle_error<K: NodeId>(network: &Network<K>, unscheduled: &BTreeSet<K>) -> NetworkError {
    let cycles: Vec<Vec<String>> = find_cycles(&network.restrict(unscheduled))
        .into_iter()
        .map(|members| members.iter().map(|m| format!("{m:?}")).collect())
        .collect();

    warn!(
        unscheduled = unscheduled.len(),
        cycles = cycles.len(),
        "network contains a cycle"
    );
    NetworkError::CycleDetected {
        unscheduled: unscheduled.len(),
        cycles,
    }
}
