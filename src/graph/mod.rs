//! Graph inputs and the per-rank owned/ghost index space.
//!
//! - `csr`: compressed adjacency over local indices
//! - `ownership`: global id → owning rank
//! - `layout`: owned/ghost partition, boundary set and ghost-holder plan
//! - `generators`: deterministic graphs for tests, benches and demos

pub mod csr;
pub mod generators;
pub mod layout;
pub mod ownership;

pub use csr::CsrAdjacency;
pub use layout::{LocalGraph, VertexLayout};
pub use ownership::{BlockOwnership, ExplicitOwnership, OwnershipMap};
