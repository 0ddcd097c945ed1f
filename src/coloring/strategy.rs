//! Local coloring kernels as injectable strategies.
//!
//! A kernel sees one rank's adjacency (owned + ghost rows) and a subset of
//! local indices to (re)color. It guarantees that, on return, no vertex of
//! the subset shares a color with any neighbor as the kernel saw it. It does
//! not know about other ranks; cross-rank correctness comes from the
//! surrounding speculate-and-recolor loop.

use serde::{Deserialize, Serialize};

use super::greedy::{BitwiseGreedy, EdgeBasedGreedy};
use crate::config::ColoringConfig;
use crate::graph::CsrAdjacency;
use crate::Color;

/// Assigns colors to a subset of local vertices.
pub trait ColoringStrategy: Send + Sync {
    /// Short identifier used in logs and statistics.
    fn name(&self) -> &'static str;

    /// Colors every vertex in `subset` with the smallest color (≥ 1) not used by
    /// any already-colored neighbor, mutating `colors` in place.
    ///
    /// Vertices in `subset` are treated as uncolored on entry. Colors outside
    /// the subset are read but never written.
    fn color_subset(&self, adjacency: &CsrAdjacency, subset: &[usize], colors: &mut [Color]);
}

/// Which built-in kernel a round used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelChoice {
    /// Speculative first-fit with an edge-list conflict pass.
    EdgeBased,
    /// Speculative first-fit with 64-color bitmask windows.
    Bitwise,
}

impl KernelChoice {
    /// Kernel for a recolor round.
    ///
    /// The bitwise kernel is picked when only a small fraction of all vertices is
    /// being recolored and the degree is bounded; inputs are global so every rank
    /// picks the same kernel.
    pub fn for_recolor(
        config: &ColoringConfig,
        recolor_global: u64,
        vertices_global: u64,
        max_degree_global: u64,
    ) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let small =
            (recolor_global as f64) < config.bitwise_recolor_fraction * vertices_global as f64;
        if small && max_degree_global < config.bitwise_max_degree as u64 {
            Self::Bitwise
        } else {
            Self::EdgeBased
        }
    }

    /// The built-in strategy implementing this choice.
    pub fn strategy(self) -> &'static dyn ColoringStrategy {
        match self {
            Self::EdgeBased => &EdgeBasedGreedy,
            Self::Bitwise => &BitwiseGreedy,
        }
    }

    /// Same as [`ColoringStrategy::name`] of [`KernelChoice::strategy`].
    pub fn name(self) -> &'static str {
        self.strategy().name()
    }
}

impl core::fmt::Display for KernelChoice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_bounded_recolor_uses_bitwise() {
        let config = ColoringConfig::default();
        assert_eq!(KernelChoice::for_recolor(&config, 5, 1000, 10), KernelChoice::Bitwise);
    }

    #[test]
    fn large_or_dense_recolor_uses_edge_based() {
        let config = ColoringConfig::default();
        assert_eq!(KernelChoice::for_recolor(&config, 500, 1000, 10), KernelChoice::EdgeBased);
        assert_eq!(KernelChoice::for_recolor(&config, 5, 1000, 6000), KernelChoice::EdgeBased);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(KernelChoice::EdgeBased.to_string(), "edge-based");
        assert_eq!(KernelChoice::Bitwise.to_string(), "bitwise");
        assert_eq!(
            serde_json::to_string(&KernelChoice::Bitwise).unwrap(),
            "\"bitwise\""
        );
    }
}
