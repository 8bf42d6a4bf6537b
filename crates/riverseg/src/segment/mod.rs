//! Segment decomposition and segment dependencies.
//!
//! ## Pipeline
//!
//! ```text
//! Network (downstream adjacency)
//!        ↓  decompose::dfs_decomposition(policy)
//! Vec<Vec<K>>  (segments, upstream-first, outlet first within a segment)
//!        ↓  deps::segment_deps()
//! SegmentDeps  (segment position → downstream segment position)
//!        ↓  SegmentDeps::to_network() + schedule::kahn_wavefronts()
//! parallel batches of segments
//! ```

pub mod decompose;
pub mod deps;

pub use decompose::{PathPolicy, SplitAtJunction, SplitAtWaterbodiesAndJunctions, dfs_decomposition};
pub use deps::{SegmentDeps, SegmentIndex, segment_deps};
