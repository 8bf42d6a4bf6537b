//! Depth-first decomposition of a network into simple segments.
//!
//! # Algorithm
//!
//! 1. Walk downstream from each source with an explicit DFS stack. Each
//!    stack frame holds a node, its target list and a cursor into it. A
//!    shared visited set means a suffix reached from several sources is
//!    explored once.
//! 2. When the top frame has no unvisited target left it is popped and a
//!    path is started at its node. The path then absorbs the frames below it
//!    (its upstream ancestors on the stack) while the [`PathPolicy`] agrees.
//!    The first refused ancestor stays on the stack and later starts a path
//!    of its own. Absorbed frames are removed from the stack.
//! 3. Paths finish downstream-first, so the finished list is reversed
//!    before returning. For an acyclic network this puts every segment
//!    before the segment its outlet drains into.
//!
//! Each path lists its outlet (downstream-most node) first and its
//! farthest-upstream node last.
//!
//! # Policy contract
//!
//! A walk stops at the first ancestor the policy refuses and never asks
//! about the ancestors above it. Policies are therefore assumed monotone
//! along a walk; a policy whose answer would flip back to `true` further up
//! the stack is not consulted there. Independently of the policy, an
//! ancestor that still has unexplored targets is never absorbed.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::network::{Network, NodeId, algebra};

/// Decides whether a path may extend upstream through `candidate`.
///
/// `path` is the segment so far: outlet first, current upstream end last.
/// `candidate` is the node immediately upstream of `path`'s last element.
pub trait PathPolicy<K> {
    fn extends(&mut self, path: &[K], candidate: &K) -> bool;
}

impl<K, F> PathPolicy<K> for F
where
    F: FnMut(&[K], &K) -> bool,
{
    fn extends(&mut self, path: &[K], candidate: &K) -> bool {
        self(path, candidate)
    }
}

// ---------------------------------------------------------------------------
// Built-in policies
// ---------------------------------------------------------------------------

/// Break segments at confluences and diversions.
///
/// Extends through `candidate` only when it has exactly one downstream target
/// and the path's current upstream end is not a junction, so every junction
/// starts at the upstream end of its own segment.
#[derive(Debug, Clone)]
pub struct SplitAtJunction<'a, K> {
    network: &'a Network<K>,
    junctions: BTreeSet<K>,
}

impl<'a, K: NodeId> SplitAtJunction<'a, K> {
    #[must_use]
    pub fn new(network: &'a Network<K>) -> Self {
        Self {
            network,
            junctions: algebra::junctions(network),
        }
    }
}

impl<K: NodeId> PathPolicy<K> for SplitAtJunction<'_, K> {
    fn extends(&mut self, path: &[K], candidate: &K) -> bool {
        self.network.targets(candidate).len() == 1
            && path.last().is_some_and(|end| !self.junctions.contains(end))
    }
}

/// Break segments at junctions and around waterbodies (lakes, reservoirs).
///
/// A waterbody never joins a path as an ancestor, and no path extends past
/// a waterbody at its upstream end, so each waterbody reach is routed in a
/// segment of its own.
#[derive(Debug, Clone)]
pub struct SplitAtWaterbodiesAndJunctions<'a, K> {
    junction: SplitAtJunction<'a, K>,
    waterbodies: BTreeSet<K>,
}

impl<'a, K: NodeId> SplitAtWaterbodiesAndJunctions<'a, K> {
    #[must_use]
    pub fn new(network: &'a Network<K>, waterbodies: impl IntoIterator<Item = K>) -> Self {
        Self {
            junction: SplitAtJunction::new(network),
            waterbodies: waterbodies.into_iter().collect(),
        }
    }
}

impl<K: NodeId> PathPolicy<K> for SplitAtWaterbodiesAndJunctions<'_, K> {
    fn extends(&mut self, path: &[K], candidate: &K) -> bool {
        !self.waterbodies.contains(candidate)
            && path.last().is_some_and(|end| !self.waterbodies.contains(end))
            && self.junction.extends(path, candidate)
    }
}

// ---------------------------------------------------------------------------
// Decomposition
// ---------------------------------------------------------------------------

struct Frame<'a, K> {
    node: K,
    targets: &'a [K],
    cursor: usize,
}

impl<'a, K: NodeId> Frame<'a, K> {
    fn new(network: &'a Network<K>, node: K) -> Self {
        let targets = network.targets(&node);
        Self {
            node,
            targets,
            cursor: 0,
        }
    }

    fn has_pending(&self) -> bool {
        self.cursor < self.targets.len()
    }
}

/// Decompose `network` into simple paths ordered upstream-first.
///
/// `sources` defaults to the network's headwaters. Every node reachable from
/// the sources appears in exactly one path. Sources already reached from an
/// earlier source are skipped, as are sources that are not nodes of
/// `network`. See the module docs for the ordering
/// guarantee and the policy contract.
#[instrument(skip_all, fields(nodes = network.len()))]
pub fn dfs_decomposition<K, P>(
    network: &Network<K>,
    mut policy: P,
    sources: Option<&[K]>,
) -> Vec<Vec<K>>
where
    K: NodeId,
    P: PathPolicy<K>,
{
    let sources: Vec<K> = match sources {
        Some(sources) => {
            let known: BTreeSet<&K> = network.nodes().collect();
            sources
                .iter()
                .filter(|source| {
                    let found = known.contains(source);
                    if !found {
                        debug!(?source, "source is not in the network, skipped");
                    }
                    found
                })
                .cloned()
                .collect()
        }
        None => algebra::headwaters(network).into_iter().collect(),
    };

    let mut paths: Vec<Vec<K>> = Vec::new();
    let mut visited: BTreeSet<K> = BTreeSet::new();
    let mut stack: Vec<Frame<'_, K>> = Vec::new();

    for source in sources {
        if !visited.insert(source.clone()) {
            continue;
        }
        stack.push(Frame::new(network, source));

        while let Some(frame) = stack.last_mut() {
            let targets = frame.targets;
            if let Some(child) = targets.get(frame.cursor) {
                frame.cursor += 1;
                if visited.insert(child.clone()) {
                    stack.push(Frame::new(network, child.clone()));
                }
                continue;
            }

            let Some(finished) = stack.pop() else { break };
            let mut path = vec![finished.node];
            for ancestor in stack.iter().rev() {
                if ancestor.has_pending() || !policy.extends(&path, &ancestor.node) {
                    break;
                }
                path.push(ancestor.node.clone());
            }

            let absorbed = path.len() - 1;
            stack.truncate(stack.len() - absorbed);
            paths.push(path);
        }
    }

    paths.reverse();
    debug!(segments = paths.len(), visited = visited.len(), "decomposed network");
    paths
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
