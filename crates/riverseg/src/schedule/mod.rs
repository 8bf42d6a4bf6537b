//! Topological scheduling of node- and segment-level networks.
//!
//! - [`kahn`]: Kahn ordering (nodes, edges, wavefronts).
//! - [`cycles`]: cycle reporting used when ordering fails.

pub mod cycles;
pub mod kahn;

pub use cycles::find_cycles;
pub use kahn::{KahnIter, kahn_toposort, kahn_toposort_edges, kahn_wavefronts};
