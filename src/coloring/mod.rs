//! Speculate-and-recolor graph coloring.
//!
//! Layered bottom-up:
//! - `tiebreak`: seeded total order over global ids
//! - `strategy` / `greedy`: local first-fit kernels behind [`ColoringStrategy`]
//! - `state`: owned + ghost color array and the ghost exchange
//! - `conflict`: cross-rank conflict scan
//! - `engine`: the round loop tying them together
//! - `stats`: per-round diagnostics

pub mod conflict;
pub mod engine;
pub mod greedy;
pub mod state;
pub mod stats;
pub mod strategy;
pub mod tiebreak;

pub use conflict::{count_violations, detect_conflicts, ConflictScan};
pub use engine::{color_cluster, color_local, ColoringOutcome, DistributedColoring, Phase};
pub use greedy::{BitwiseGreedy, EdgeBasedGreedy, SequentialGreedy};
pub use state::{ExchangeVolume, GhostedColors};
pub use stats::{ColorSummary, ColoringStats, RoundStats};
pub use strategy::{ColoringStrategy, KernelChoice};
pub use tiebreak::TieBreak;
