//! Property tests over randomly generated acyclic river networks.
//!
//! Generated networks draw every edge from a lower id to a higher id, so
//! they are acyclic by construction. Targets may run past the last keyed
//! node (implicit leaves) and some nodes divert into two targets.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use riverseg::network::{Network, headwaters, reverse_network, tailwaters};
use riverseg::schedule::{kahn_toposort, kahn_toposort_edges, kahn_wavefronts};
use riverseg::segment::{SplitAtJunction, SplitAtWaterbodiesAndJunctions, dfs_decomposition, segment_deps};

/// (has downstream, target offset, diverts, second offset, is waterbody)
type Spec = (bool, u32, bool, u32, bool);

fn build(specs: &[Spec]) -> Network<u32> {
    let n = u32::try_from(specs.len()).unwrap_or(u32::MAX);
    let mut network = Network::new();
    for (i, &(flows, off, diverts, off2, _)) in (0_u32..).zip(specs) {
        network.insert_node(i);
        if !flows {
            continue;
        }
        // Targets in (i, n + 2]: ids >= n are implicit leaves.
        let span = n + 2 - i;
        network.add_edge(i, i + 1 + off % span);
        if diverts {
            let second = i + 1 + off2 % span;
            if !network.targets(&i).contains(&second) {
                network.add_edge(i, second);
            }
        }
    }
    network
}

fn waterbodies(specs: &[Spec]) -> Vec<u32> {
    (0_u32..)
        .zip(specs)
        .filter(|(_, spec)| spec.4)
        .map(|(i, _)| i)
        .collect()
}

fn network_specs() -> impl Strategy<Value = Vec<Spec>> {
    prop::collection::vec(
        (
            prop::bool::weighted(0.85),
            0_u32..64,
            prop::bool::weighted(0.1),
            0_u32..64,
            prop::bool::weighted(0.15),
        ),
        0..48,
    )
}

fn positions(segments: &[Vec<u32>]) -> BTreeMap<u32, usize> {
    let mut pos = BTreeMap::new();
    for (i, segment) in segments.iter().enumerate() {
        for &node in segment {
            assert!(pos.insert(node, i).is_none(), "node {node} in two segments");
        }
    }
    pos
}

proptest! {
    #[test]
    fn prop_nodes_are_keys_and_targets(specs in network_specs()) {
        let n = build(&specs);
        let nodes: Vec<u32> = n.nodes().copied().collect();
        let unique: BTreeSet<u32> = nodes.iter().copied().collect();
        prop_assert_eq!(nodes.len(), unique.len(), "nodes() yielded a duplicate");

        let mut expected: BTreeSet<u32> = n.keys().copied().collect();
        expected.extend(n.edges().map(|(_, dst)| *dst));
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn prop_reverse_in_degrees_are_out_degrees(specs in network_specs()) {
        let n = build(&specs);
        prop_assert_eq!(reverse_network(&n).in_degrees(), n.out_degrees());

        let reverse_nodes: BTreeSet<u32> = reverse_network(&n).nodes().copied().collect();
        let nodes: BTreeSet<u32> = n.nodes().copied().collect();
        prop_assert_eq!(reverse_nodes, nodes);
    }

    #[test]
    fn prop_headwaters_have_no_inflow(specs in network_specs()) {
        let n = build(&specs);
        let degrees = n.in_degrees();
        let heads = headwaters(&n);
        for key in n.keys() {
            if heads.contains(key) {
                prop_assert_eq!(degrees[key], 0);
            } else {
                prop_assert!(degrees[key] >= 1);
            }
        }
        for tail in tailwaters(&n) {
            prop_assert!(n.targets(&tail).is_empty());
        }
    }

    #[test]
    fn prop_decomposition_partitions_and_orders(specs in network_specs()) {
        let n = build(&specs);
        let segments = dfs_decomposition(&n, SplitAtJunction::new(&n), None);
        let pos = positions(&segments);

        let nodes: BTreeSet<u32> = n.nodes().copied().collect();
        let covered: BTreeSet<u32> = pos.keys().copied().collect();
        prop_assert_eq!(covered, nodes);

        for (src, dst) in n.edges() {
            let (a, b) = (pos[src], pos[dst]);
            prop_assert!(a <= b, "edge {}->{} goes from segment {} back to {}", src, dst, a, b);
        }
    }

    #[test]
    fn prop_segments_are_simple_paths(specs in network_specs()) {
        let n = build(&specs);
        let segments = dfs_decomposition(&n, SplitAtJunction::new(&n), None);
        for segment in &segments {
            // Outlet first: each element drains into the one before it.
            for pair in segment.windows(2) {
                prop_assert_eq!(n.targets(&pair[1]), &[pair[0]][..]);
            }
        }
    }

    #[test]
    fn prop_waterbodies_stand_alone(specs in network_specs()) {
        let n = build(&specs);
        let lakes = waterbodies(&specs);
        let segments = dfs_decomposition(
            &n,
            SplitAtWaterbodiesAndJunctions::new(&n, lakes.iter().copied()),
            None,
        );
        positions(&segments);
        for segment in &segments {
            if segment.iter().any(|node| lakes.contains(node)) {
                prop_assert_eq!(segment.len(), 1);
            }
        }
    }

    #[test]
    fn prop_segment_deps_point_forward(specs in network_specs()) {
        let n = build(&specs);
        let segments = dfs_decomposition(&n, SplitAtJunction::new(&n), None);
        let deps = segment_deps(&segments, &n);
        for (i, downstream) in deps.iter() {
            for &j in downstream {
                prop_assert!(i < j);
            }
        }
        prop_assert!(kahn_toposort(&deps.to_network()).is_ok());
    }

    #[test]
    fn prop_toposort_is_a_valid_permutation(specs in network_specs()) {
        let n = build(&specs);
        let order = kahn_toposort(&n).expect("generated networks are acyclic");

        let nodes: BTreeSet<u32> = n.nodes().copied().collect();
        let ordered: BTreeSet<u32> = order.iter().copied().collect();
        prop_assert_eq!(order.len(), nodes.len());
        prop_assert_eq!(ordered, nodes);

        let rank: BTreeMap<u32, usize> = order.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        for (src, dst) in n.edges() {
            prop_assert!(rank[src] < rank[dst]);
        }
        prop_assert_eq!(kahn_toposort_edges(&n).expect("acyclic").len(), n.edge_count());
    }

    #[test]
    fn prop_wavefronts_cover_and_respect_edges(specs in network_specs()) {
        let n = build(&specs);
        let waves = kahn_wavefronts(&n).expect("generated networks are acyclic");

        let mut level: BTreeMap<u32, usize> = BTreeMap::new();
        for (i, wave) in waves.iter().enumerate() {
            for &node in wave {
                prop_assert!(level.insert(node, i).is_none());
            }
        }
        prop_assert_eq!(level.len(), n.node_count());
        for (src, dst) in n.edges() {
            prop_assert!(level[src] < level[dst]);
        }
    }

    #[test]
    fn prop_back_edge_creates_cycle(specs in network_specs(), pick in 0_usize..1000) {
        let mut n = build(&specs);
        let edges: Vec<(u32, u32)> = n.edges().map(|(a, b)| (*a, *b)).collect();
        prop_assume!(!edges.is_empty());

        let (src, dst) = edges[pick % edges.len()];
        n.add_edge(dst, src);
        prop_assert!(kahn_toposort(&n).is_err());
    }
}
