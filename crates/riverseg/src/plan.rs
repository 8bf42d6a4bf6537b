//! End-to-end planning: network → segments → dependencies → wavefronts.
//!
//! An [`ExecutionPlan`] is what a routing executor consumes: the ordered
//! segment list, the segment dependency graph and the wavefronts of segment
//! positions that may run concurrently. With
//! [`PlanConfig::partition_by_outlet`] the network is first split into the
//! upstream basins of its outlets and each basin is planned on its own, so a
//! caller can hand whole basins to separate workers.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument};

use crate::config::{PlanConfig, SplitPolicyKind};
use crate::error::NetworkError;
use crate::network::{Network, NodeId, algebra};
use crate::schedule::{kahn_toposort, kahn_wavefronts};
use crate::segment::{
    SegmentDeps, SplitAtJunction, SplitAtWaterbodiesAndJunctions, dfs_decomposition, segment_deps,
};

/// Ordered work for one (sub-)network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan<K> {
    /// Segments upstream-first; outlet first within each segment.
    pub segments: Vec<Vec<K>>,
    pub deps: SegmentDeps,
    /// Segment positions grouped into dependency levels.
    pub waves: Vec<Vec<usize>>,
    /// Outlets of the planned network.
    pub outlets: BTreeSet<K>,
    /// [`Network::content_hash`] of the planned network.
    pub content_hash: String,
}

impl<K: NodeId> ExecutionPlan<K> {
    /// Plan `network` as a single unit.
    ///
    /// `waterbodies` is only consulted by
    /// [`SplitPolicyKind::WaterbodiesAndJunctions`].
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::CycleDetected`] if the network has a cycle.
    #[instrument(skip_all, fields(nodes = network.len(), policy = ?config.split_policy))]
    pub fn build(
        network: &Network<K>,
        config: &PlanConfig,
        waterbodies: &[K],
    ) -> Result<Self, NetworkError> {
        // Cycles must fail here; the decomposer would silently skip nodes
        // that no headwater reaches.
        kahn_toposort(network)?;

        let segments = match config.split_policy {
            SplitPolicyKind::Junction => {
                dfs_decomposition(network, SplitAtJunction::new(network), None)
            }
            SplitPolicyKind::WaterbodiesAndJunctions => dfs_decomposition(
                network,
                SplitAtWaterbodiesAndJunctions::new(network, waterbodies.iter().cloned()),
                None,
            ),
        };
        let deps = segment_deps(&segments, network);
        let waves = kahn_wavefronts(&deps.to_network())?;

        debug!(
            segments = segments.len(),
            waves = waves.len(),
            "execution plan built"
        );
        Ok(Self {
            segments,
            deps,
            waves,
            outlets: algebra::tailwaters(network),
            content_hash: network.content_hash(),
        })
    }

    /// Plan each outlet's upstream basin separately, keyed by outlet.
    ///
    /// Basins are found by reachability over the reversed network starting
    /// at its headwaters, i.e. the outlets of `network`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::PartitionOverlap`] if `config.check_disjoint`
    /// is set and two basins share a reach (a diversion feeding two
    /// outlets), or [`NetworkError::CycleDetected`] for cyclic input.
    #[instrument(skip_all, fields(nodes = network.len()))]
    pub fn build_independent(
        network: &Network<K>,
        config: &PlanConfig,
        waterbodies: &[K],
    ) -> Result<BTreeMap<K, Self>, NetworkError> {
        // A closed loop drains to no outlet, so no basin would contain it.
        kahn_toposort(network)?;

        let reversed = algebra::reverse_network(network);
        let basins = algebra::reachable_network(&reversed, None, None, config.check_disjoint)?;
        info!(basins = basins.len(), "planning independent basins");

        basins
            .into_iter()
            .map(|(outlet, upstream)| {
                let plan = Self::build(&algebra::reverse_network(&upstream), config, waterbodies)?;
                Ok((outlet, plan))
            })
            .collect()
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segments of wavefront `wave`, in position order.
    pub fn wave_segments(&self, wave: usize) -> impl Iterator<Item = &[K]> {
        self.waves
            .get(wave)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.segments.get(i).map(Vec::as_slice))
    }
}

/// Plan `network` according to `config`: one plan, or one per outlet basin
/// (in outlet order) when `partition_by_outlet` is set.
///
/// # Errors
///
/// See [`ExecutionPlan::build`] and [`ExecutionPlan::build_independent`].
pub fn plan<K: NodeId>(
    network: &Network<K>,
    config: &PlanConfig,
    waterbodies: &[K],
) -> Result<Vec<ExecutionPlan<K>>, NetworkError> {
    if config.partition_by_outlet {
        ExecutionPlan::build_independent(network, config, waterbodies)
            .map(|plans| plans.into_values().collect())
    } else {
        ExecutionPlan::build(network, config, waterbodies).map(|plan| vec![plan])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
