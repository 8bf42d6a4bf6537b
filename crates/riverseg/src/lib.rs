#![forbid(unsafe_code)]
//! riverseg library.
//!
//! Decomposes a directed river network into maximal non-branching segments
//! and orders them so a routing executor can process reaches upstream to
//! downstream, in parallel where dependencies allow.
//!
//! ## Pipeline
//!
//! ```text
//! RouteLinks (reach → downstream reach, terminal sentinel)
//!        ↓  network::extract_connections()
//! Network (adjacency, implicit leaves)
//!        ↓  network::algebra  (headwaters, junctions, reachability)
//!        ↓  segment::dfs_decomposition(policy)
//! segments (upstream-first)
//!        ↓  segment::segment_deps()
//! SegmentDeps
//!        ↓  schedule::kahn_wavefronts()
//! parallel batches
//! ```
//!
//! [`ExecutionPlan`] runs the whole pipeline from a [`config::PlanConfig`].
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::NetworkError`] for graph failures;
//!   `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod network;
pub mod plan;
pub mod schedule;
pub mod segment;

pub use config::{PlanConfig, SplitPolicyKind};
pub use error::{ErrorCode, NetworkError};
pub use network::{Network, NodeId, RouteLinks};
pub use plan::{ExecutionPlan, plan};
