//! Per-round diagnostics and color-class summaries.

use std::time::Duration;

use serde::Serialize;

use super::state::ExchangeVolume;
use crate::{Color, UNCOLORED};

/// What one rank did in one round. Round 0 is the initial coloring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStats {
    /// Round number.
    pub round: usize,
    /// Name of the strategy that colored this round.
    pub kernel: &'static str,
    /// Vertices (owned and ghost guesses) colored on this rank.
    pub recolored_local: usize,
    /// Owned vertices colored across all ranks.
    pub recolored_global: u64,
    /// Conflicts this rank observed after the round's exchange.
    pub conflicts_local: usize,
    /// Conflict observations summed over ranks (a cross-rank edge is seen by both ends).
    pub conflicts_global: u64,
    /// Ghost exchange traffic.
    pub volume: ExchangeVolume,
    /// Time spent in the kernel and conflict scan.
    pub compute_time: Duration,
    /// Time spent in collectives.
    pub comm_time: Duration,
}

impl RoundStats {
    pub(crate) fn new(round: usize, kernel: &'static str) -> Self {
        Self {
            round,
            kernel,
            recolored_local: 0,
            recolored_global: 0,
            conflicts_local: 0,
            conflicts_global: 0,
            volume: ExchangeVolume::default(),
            compute_time: Duration::ZERO,
            comm_time: Duration::ZERO,
        }
    }
}

/// Statistics for a whole run on one rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoringStats {
    /// Reporting rank.
    pub rank: usize,
    /// Number of ranks.
    pub size: usize,
    /// Recolor rounds after the initial coloring.
    pub rounds: usize,
    /// One entry per round, starting with the initial coloring.
    pub per_round: Vec<RoundStats>,
    /// Largest color used on any rank.
    pub num_colors: Color,
    /// Wall time of the whole run on this rank.
    pub total_time: Duration,
}

impl ColoringStats {
    pub(crate) fn new(rank: usize, size: usize) -> Self {
        Self {
            rank,
            size,
            rounds: 0,
            per_round: Vec::new(),
            num_colors: 0,
            total_time: Duration::ZERO,
        }
    }

    /// Traffic summed over all rounds.
    pub fn total_volume(&self) -> ExchangeVolume {
        let mut total = ExchangeVolume::default();
        for r in &self.per_round {
            total += r.volume;
        }
        total
    }

    /// Rank-tagged report lines.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .per_round
            .iter()
            .map(|r| {
                format!(
                    "[rank {}] round {}: kernel={} recolored={} (global {}) \
                     conflicts={} (global {}) sent={} recv={} bytes={} \
                     compute={:.3?} comm={:.3?}",
                    self.rank,
                    r.round,
                    r.kernel,
                    r.recolored_local,
                    r.recolored_global,
                    r.conflicts_local,
                    r.conflicts_global,
                    r.volume.updates_sent,
                    r.volume.updates_received,
                    r.volume.bytes_sent,
                    r.compute_time,
                    r.comm_time,
                )
            })
            .collect();
        let total = self.total_volume();
        lines.push(format!(
            "[rank {}] done: rounds={} colors={} sent={} recv={} time={:.3?}",
            self.rank,
            self.rounds,
            self.num_colors,
            total.updates_sent,
            total.updates_received,
            self.total_time
        ));
        lines
    }

    /// Prints [`ColoringStats::report_lines`] to stdout.
    pub fn report(&self) {
        for line in self.report_lines() {
            println!("{line}");
        }
    }

    /// Pretty JSON rendering.
    ///
    /// # Errors
    /// Propagates `serde_json` failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Color-class sizes for a set of colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorSummary {
    /// Largest color present.
    pub num_colors: Color,
    /// `sizes[c - 1]` vertices carry color `c`.
    pub sizes: Vec<usize>,
    /// Vertices still at the uncolored sentinel.
    pub uncolored: usize,
}

impl ColorSummary {
    /// Summarizes `colors`.
    pub fn from_colors(colors: &[Color]) -> Self {
        let num_colors = colors.iter().copied().max().unwrap_or(UNCOLORED);
        let mut sizes = vec![0usize; num_colors as usize];
        let mut uncolored = 0;
        for &c in colors {
            if c == UNCOLORED {
                uncolored += 1;
            } else {
                sizes[c as usize - 1] += 1;
            }
        }
        Self {
            num_colors,
            sizes,
            uncolored,
        }
    }

    /// Smallest over largest non-empty class size; `1.0` is perfectly even.
    pub fn balance_factor(&self) -> f64 {
        let used = self.sizes.iter().copied().filter(|&s| s > 0);
        let (min, max) = used.fold((usize::MAX, 0), |(lo, hi), s| (lo.min(s), hi.max(s)));
        if max == 0 {
            1.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = min as f64 / max as f64;
            ratio
        }
    }
}
