//! # `ghostcolor` - Distributed Speculate-and-Recolor Graph Coloring
//!
//! Colors a graph whose vertices are partitioned across ranks so that no two
//! adjacent vertices share a color, using colors `1..=K` (`0` is reserved for
//! "uncolored").
//!
//! ## Model
//!
//! Each rank owns a set of vertices and keeps read-only *ghost* replicas of the
//! remote vertices its owned vertices touch. Owned and ghost vertices share one
//! local index space (`[0, n_owned)` then `[n_owned, n_owned + n_ghost)`), so
//! every per-vertex array is a flat `Vec` indexed by local id.
//!
//! ## Algorithm
//!
//! 1. Color all owned vertices locally, ignoring other ranks.
//! 2. Push boundary colors to the ranks that ghost them.
//! 3. Scan cross-rank edges; for each same-colored edge, a seeded hash of the
//!    global id decides who keeps the color.
//! 4. Recolor the losers locally and go back to 2 until no rank reports a conflict.
//!
//! Conflicts can only appear on cross-rank edges, so only boundary vertices are
//! ever recolored after the first pass.
//!
//! ## Layers
//!
//! - [`graph`]: CSR adjacency, ownership maps, owned/ghost layout, generators
//! - [`comm`]: the [`Communicator`](comm::Communicator) trait, wire format and
//!   in-process rank clusters
//! - [`coloring`]: kernels, ghost state, conflict detection and the round loop
//! - [`concurrency`]: atomic bitset and parallel helpers used by the kernels
//!
//! ## Example
//!
//! ```rust
//! use ghostcolor::graph::generators;
//! use ghostcolor::{color_cluster, ColoringConfig};
//!
//! let adj = generators::grid(8, 8);
//! let (ownership, locals) = generators::partition_blocks(&adj, 4);
//! let outcomes = color_cluster(&ownership, &locals, &ColoringConfig::default()).unwrap();
//!
//! let mut colors = vec![0; adj.len()];
//! for (gid, color) in outcomes.iter().flat_map(|o| o.iter()) {
//!     colors[gid as usize] = color;
//! }
//! for (u, nbrs) in adj.iter().enumerate() {
//!     for &v in nbrs {
//!         assert_ne!(colors[u], colors[v as usize]);
//!     }
//! }
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod coloring;
pub mod comm;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;

pub use coloring::{
    color_cluster, color_local, ColorSummary, ColoringOutcome, ColoringStats, ColoringStrategy,
    DistributedColoring, GhostedColors, KernelChoice, TieBreak,
};
pub use comm::{Communicator, LocalCluster, SingleRankComm, ThreadComm};
pub use config::ColoringConfig;
pub use error::{ColoringError, Result};
pub use graph::{
    BlockOwnership, CsrAdjacency, ExplicitOwnership, LocalGraph, OwnershipMap, VertexLayout,
};

/// Global vertex identifier, unique across all ranks.
pub type GlobalId = u64;

/// Vertex color. Valid colors start at 1.
pub type Color = u32;

/// Sentinel for a vertex without a color.
pub const UNCOLORED: Color = 0;

// Wire records must stay fixed-size and padding-free.
const _: () = {
    assert!(core::mem::size_of::<comm::ColorUpdate>() == 12);
    assert!(core::mem::align_of::<comm::ColorUpdate>() == 1);
};
