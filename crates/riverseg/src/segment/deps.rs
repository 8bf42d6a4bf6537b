//! Segment-level dependency graph.
//!
//! After decomposition each segment's outlet drains (at most) into one
//! downstream reach, and that reach belongs to another segment. The
//! dependency graph records, per segment position, the position of that
//! downstream segment. Only the first downstream connection of an outlet is
//! followed; a segment whose outlet has no target has no entry.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::network::{Network, NodeId};

/// Node → position of the segment containing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIndex<K> {
    positions: BTreeMap<K, usize>,
}

impl<K: NodeId> SegmentIndex<K> {
    #[must_use]
    pub fn new(segments: &[Vec<K>]) -> Self {
        let positions = segments
            .iter()
            .enumerate()
            .flat_map(|(i, segment)| segment.iter().map(move |node| (node.clone(), i)))
            .collect();
        Self { positions }
    }

    /// Position of the segment containing `node`.
    #[must_use]
    pub fn position(&self, node: &K) -> Option<usize> {
        self.positions.get(node).copied()
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Segment position → positions of the segment(s) it drains into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentDeps {
    segment_count: usize,
    downstream: BTreeMap<usize, Vec<usize>>,
}

impl SegmentDeps {
    /// Downstream segment positions of segment `i`; empty for outlets.
    #[must_use]
    pub fn downstream_of(&self, i: usize) -> &[usize] {
        self.downstream.get(&i).map_or(&[], Vec::as_slice)
    }

    /// Entries for segments that have a downstream segment.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.downstream.iter().map(|(i, deps)| (*i, deps.as_slice()))
    }

    /// Number of segments with a dependency entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.downstream.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.downstream.is_empty()
    }

    /// Total number of segments the graph was built for.
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Segment-level network over every position, for scheduling.
    #[must_use]
    pub fn to_network(&self) -> Network<usize> {
        (0..self.segment_count)
            .map(|i| (i, self.downstream_of(i).to_vec()))
            .collect()
    }
}

/// Map each segment to the segment its outlet drains into.
///
/// `connections` is the forward network the segments were built from.
/// Downstream reaches not covered by any segment are skipped.
#[instrument(skip_all, fields(segments = segments.len()))]
pub fn segment_deps<K: NodeId>(segments: &[Vec<K>], connections: &Network<K>) -> SegmentDeps {
    let index = SegmentIndex::new(segments);
    let mut downstream: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for (i, segment) in segments.iter().enumerate() {
        let Some(outlet) = segment.first() else {
            continue;
        };
        let Some(target) = connections.targets(outlet).first() else {
            continue;
        };
        match index.position(target) {
            Some(j) if j != i => downstream.entry(i).or_default().push(j),
            Some(_) => {}
            None => debug!(?outlet, ?target, "downstream reach not in any segment"),
        }
    }

    SegmentDeps {
        segment_count: segments.len(),
        downstream,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{SplitAtJunction, dfs_decomposition};

    #[test]
    fn index_covers_every_node() {
        let segments = vec![vec![2_u32], vec![1], vec![5, 4, 3]];
        let index = SegmentIndex::new(&segments);
        assert_eq!(index.len(), 5);
        assert_eq!(index.position(&2), Some(0));
        assert_eq!(index.position(&4), Some(2));
        assert_eq!(index.position(&9), None);
    }

    #[test]
    fn junction_segments_feed_confluence() {
        let n = Network::from([(1_u32, vec![3]), (2, vec![3]), (3, vec![])]);
        let segments = dfs_decomposition(&n, SplitAtJunction::new(&n), None);
        assert_eq!(segments, vec![vec![2], vec![1], vec![3]]);

        let deps = segment_deps(&segments, &n);
        assert_eq!(deps.segment_count(), 3);
        assert_eq!(deps.downstream_of(0), &[2]);
        assert_eq!(deps.downstream_of(1), &[2]);
        assert!(deps.downstream_of(2).is_empty());
        assert_eq!(deps.len(), 2, "outlet segment has no entry");
    }

    #[test]
    fn dependencies_point_forward() {
        let n = Network::from([
            (1_u32, vec![2]),
            (2, vec![5]),
            (3, vec![4]),
            (4, vec![5]),
            (5, vec![6]),
            (6, vec![8]),
            (7, vec![8]),
            (8, vec![9]),
        ]);
        let segments = dfs_decomposition(&n, SplitAtJunction::new(&n), None);
        let deps = segment_deps(&segments, &n);

        for (i, downstream) in deps.iter() {
            for &j in downstream {
                assert!(i < j, "segment {i} depends on earlier segment {j}");
            }
        }
        assert_eq!(deps.len(), segments.len() - 1);
    }

    #[test]
    fn only_first_connection_is_followed() {
        let n = Network::from([(1_u32, vec![2, 3]), (2, vec![]), (3, vec![])]);
        let segments = vec![vec![1], vec![3], vec![2]];
        let deps = segment_deps(&segments, &n);
        assert_eq!(deps.downstream_of(0), &[2]);
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn uncovered_target_is_skipped() {
        let n = Network::from([(1_u32, vec![2]), (2, vec![])]);
        let deps = segment_deps(&[vec![1]], &n);
        assert!(deps.is_empty());
    }

    #[test]
    fn to_network_keeps_every_segment() {
        let deps = SegmentDeps {
            segment_count: 3,
            downstream: BTreeMap::from([(0, vec![2])]),
        };
        let network = deps.to_network();
        assert_eq!(network.len(), 3);
        assert_eq!(network.targets(&0), &[2]);
        assert!(network.targets(&1).is_empty());
    }

    #[test]
    fn empty_segments() {
        let n: Network<u32> = Network::new();
        let deps = segment_deps(&[], &n);
        assert_eq!(deps.segment_count(), 0);
        assert!(deps.to_network().is_empty());
    }
}
