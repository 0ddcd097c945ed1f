//! The speculate-and-recolor loop.
//!
//! Each rank colors what it owns without waiting for anybody, publishes its
//! boundary colors to the ranks that ghost them, and then looks for
//! cross-rank edges whose endpoints ended up with the same color. The
//! tie-break picks one loser per such edge; losers are recolored locally and
//! the cycle repeats until no rank reports a conflict.
//!
//! ```text
//! InitialColor -> Exchange -> DetectConflicts -> Done
//!                    ^               |
//!                    |               v
//!                    +---------- Recolor
//! ```
//!
//! Every transition out of `DetectConflicts` is decided on globally reduced
//! counts, so all ranks walk the same sequence of phases and enter the same
//! collectives in the same order.

use std::time::Instant;

use super::conflict::{count_violations, detect_conflicts};
use super::state::{check_layout, GhostedColors};
use super::stats::{ColorSummary, ColoringStats, RoundStats};
use super::strategy::{ColoringStrategy, KernelChoice};
use super::tiebreak::TieBreak;
use crate::comm::{Communicator, LocalCluster};
use crate::config::ColoringConfig;
use crate::error::{ColoringError, Result};
use crate::graph::{CsrAdjacency, LocalGraph, OwnershipMap, VertexLayout};
use crate::{Color, GlobalId, UNCOLORED};

/// States of the recolor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Color every owned vertex (and optionally every ghost guess).
    InitialColor,
    /// Push owned colors to ghost replicas.
    Exchange,
    /// Scan cross-rank edges and reset losers.
    DetectConflicts,
    /// Recolor the worklist.
    Recolor,
    /// No rank reported a conflict.
    Done,
}

/// Final owned colors and run statistics of one rank.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoringOutcome {
    /// Owned global ids in local order.
    pub gids: Vec<GlobalId>,
    /// Color of each owned vertex, in `1..=stats.num_colors`.
    pub colors: Vec<Color>,
    /// Per-round diagnostics.
    pub stats: ColoringStats,
}

impl ColoringOutcome {
    /// `(gid, color)` pairs in local order.
    pub fn iter(&self) -> impl Iterator<Item = (GlobalId, Color)> + '_ {
        self.gids.iter().copied().zip(self.colors.iter().copied())
    }

    /// Color-class sizes of the owned vertices.
    pub fn summary(&self) -> ColorSummary {
        ColorSummary::from_colors(&self.colors)
    }
}

/// Distributed coloring of one rank's [`VertexLayout`].
///
/// Without an injected strategy the initial pass uses
/// [`KernelChoice::EdgeBased`] and recolor rounds pick a kernel through
/// [`KernelChoice::for_recolor`]. An injected strategy is used for every pass.
pub struct DistributedColoring<'a> {
    layout: &'a VertexLayout,
    config: ColoringConfig,
    tiebreak: TieBreak,
    strategy: Option<Box<dyn ColoringStrategy>>,
}

impl core::fmt::Debug for DistributedColoring<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DistributedColoring")
            .field("rank", &self.layout.rank())
            .field("config", &self.config)
            .field("strategy", &self.strategy.as_ref().map(|s| s.name()))
            .finish_non_exhaustive()
    }
}

impl<'a> DistributedColoring<'a> {
    /// Prepares a run over `layout`.
    ///
    /// # Errors
    /// Returns [`ColoringError::InvalidConfig`] if `config` fails validation.
    pub fn new(layout: &'a VertexLayout, config: ColoringConfig) -> Result<Self> {
        config.validate()?;
        let tiebreak = TieBreak::new(config.seed);
        Ok(Self {
            layout,
            config,
            tiebreak,
            strategy: None,
        })
    }

    /// Replaces the built-in kernels with `strategy`.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl ColoringStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &ColoringConfig {
        &self.config
    }

    /// Tie-break derived from the configured seed.
    pub fn tiebreak(&self) -> &TieBreak {
        &self.tiebreak
    }

    fn strategy_for(&self, kernel: KernelChoice) -> &dyn ColoringStrategy {
        match &self.strategy {
            Some(s) => s.as_ref(),
            None => kernel.strategy(),
        }
    }

    /// Runs the loop to completion. Must be called collectively by every rank.
    ///
    /// # Errors
    /// - [`ColoringError::CommunicatorMismatch`] if `comm` is not the layout's rank/size
    /// - [`ColoringError::RoundLimitExceeded`] if conflicts remain after `max_rounds`
    /// - [`ColoringError::InvalidColoring`] if validation is enabled and fails
    /// - any communicator failure
    #[allow(clippy::too_many_lines)]
    pub fn run<C>(&self, comm: &C) -> Result<ColoringOutcome>
    where
        C: Communicator + ?Sized,
    {
        check_layout(comm, self.layout)?;
        let span = tracing::debug_span!("coloring", rank = comm.rank());
        let _guard = span.enter();

        let start = Instant::now();
        let layout = self.layout;
        let adjacency = layout.adjacency();
        let n_owned = layout.owned_count();

        let vertices_global = comm.all_reduce_sum(n_owned as u64)?;
        let local_max_degree = (0..n_owned).map(|v| adjacency.degree(v)).max().unwrap_or(0);
        let max_degree_global = comm.all_reduce_max(local_max_degree as u64)?;

        let mut stats = ColoringStats::new(comm.rank(), comm.size());
        let mut colors = GhostedColors::new(layout);
        let mut current = RoundStats::new(0, KernelChoice::EdgeBased.name());
        let mut worklist: Vec<usize> = Vec::new();
        let mut dirty: Option<Vec<usize>> = None;
        let mut round = 0usize;
        let mut phase = Phase::InitialColor;

        while phase != Phase::Done {
            phase = match phase {
                Phase::InitialColor => {
                    let timer = Instant::now();
                    let strategy = self.strategy_for(KernelChoice::EdgeBased);
                    let end = if self.config.color_ghosts_initially {
                        layout.local_count()
                    } else {
                        n_owned
                    };
                    let subset: Vec<usize> = (0..end).collect();
                    strategy.color_subset(adjacency, &subset, colors.as_mut_slice());

                    current = RoundStats::new(0, strategy.name());
                    current.recolored_local = subset.len();
                    current.recolored_global = vertices_global;
                    current.compute_time = timer.elapsed();
                    tracing::debug!(
                        rank = comm.rank(),
                        round,
                        kernel = strategy.name(),
                        colored = subset.len(),
                        "initial coloring"
                    );
                    Phase::Exchange
                }
                Phase::Exchange => {
                    let timer = Instant::now();
                    current.volume +=
                        colors.push_owned_to_ghosts(comm, layout, dirty.as_deref())?;
                    current.comm_time += timer.elapsed();
                    Phase::DetectConflicts
                }
                Phase::DetectConflicts => {
                    let timer = Instant::now();
                    let scan = detect_conflicts(layout, &mut colors, &self.tiebreak);
                    current.compute_time += timer.elapsed();

                    let timer = Instant::now();
                    let conflicts_global = comm.all_reduce_sum(scan.conflicts as u64)?;
                    current.comm_time += timer.elapsed();
                    current.conflicts_local = scan.conflicts;
                    current.conflicts_global = conflicts_global;
                    tracing::debug!(
                        rank = comm.rank(),
                        round,
                        conflicts = scan.conflicts,
                        conflicts_global,
                        "conflict scan"
                    );

                    worklist = scan.worklist;
                    stats.per_round.push(current.clone());

                    if conflicts_global == 0 {
                        Phase::Done
                    } else if self.config.max_rounds.is_some_and(|cap| round >= cap) {
                        tracing::warn!(
                            rank = comm.rank(),
                            round,
                            conflicts_global,
                            "round limit reached"
                        );
                        return Err(ColoringError::RoundLimitExceeded {
                            rounds: round,
                            conflicts: conflicts_global,
                        });
                    } else {
                        Phase::Recolor
                    }
                }
                Phase::Recolor => {
                    round += 1;
                    if at_half_budget(self.config.max_rounds, round) {
                        tracing::warn!(
                            rank = comm.rank(),
                            round,
                            "coloring has used half of its round budget"
                        );
                    }

                    let owned_losers: Vec<usize> =
                        worklist.iter().copied().filter(|&v| !layout.is_ghost(v)).collect();
                    let timer = Instant::now();
                    let recolor_global = comm.all_reduce_sum(owned_losers.len() as u64)?;
                    let comm_time = timer.elapsed();

                    let kernel = KernelChoice::for_recolor(
                        &self.config,
                        recolor_global,
                        vertices_global,
                        max_degree_global,
                    );
                    let strategy = self.strategy_for(kernel);
                    let timer = Instant::now();
                    strategy.color_subset(adjacency, &worklist, colors.as_mut_slice());

                    current = RoundStats::new(round, strategy.name());
                    current.compute_time = timer.elapsed();
                    current.comm_time = comm_time;
                    current.recolored_local = worklist.len();
                    current.recolored_global = recolor_global;
                    tracing::trace!(
                        rank = comm.rank(),
                        round,
                        kernel = strategy.name(),
                        recolor = worklist.len(),
                        "recolor"
                    );

                    dirty = Some(owned_losers);
                    Phase::Exchange
                }
                Phase::Done => Phase::Done,
            };
        }
        stats.rounds = round;

        if self.config.validate {
            self.validate(comm, &mut colors)?;
        }

        let local_colors = colors.owned().iter().copied().max().unwrap_or(UNCOLORED);
        let num_colors = comm.all_reduce_max(u64::from(local_colors))?;
        stats.num_colors = Color::try_from(num_colors).map_err(|_| {
            ColoringError::MalformedMessage(format!(
                "global color count {num_colors} does not fit a color"
            ))
        })?;
        stats.total_time = start.elapsed();

        tracing::info!(
            rank = comm.rank(),
            rounds = stats.rounds,
            colors = stats.num_colors,
            elapsed = ?stats.total_time,
            "coloring finished"
        );
        if self.config.verbose {
            stats.report();
        }

        Ok(ColoringOutcome {
            gids: layout.gids()[..n_owned].to_vec(),
            colors: colors.into_owned(),
            stats,
        })
    }

    fn validate<C>(&self, comm: &C, colors: &mut GhostedColors) -> Result<()>
    where
        C: Communicator + ?Sized,
    {
        colors.push_owned_to_ghosts(comm, self.layout, None)?;
        let (conflicts, uncolored) = count_violations(self.layout, colors);
        let conflicts = comm.all_reduce_sum(conflicts as u64)?;
        let uncolored = comm.all_reduce_sum(uncolored as u64)?;
        if conflicts == 0 && uncolored == 0 {
            Ok(())
        } else {
            Err(ColoringError::InvalidColoring { conflicts, uncolored })
        }
    }
}

/// True on the recolor round that reaches half of a bounded budget.
fn at_half_budget(max_rounds: Option<usize>, round: usize) -> bool {
    matches!(max_rounds, Some(cap) if cap >= 2 && round == cap / 2)
}

/// Colors every vertex of a purely local graph with `strategy`.
pub fn color_local(adjacency: &CsrAdjacency, strategy: &dyn ColoringStrategy) -> Vec<Color> {
    let mut colors = vec![UNCOLORED; adjacency.vertex_count()];
    let all: Vec<usize> = (0..adjacency.vertex_count()).collect();
    strategy.color_subset(adjacency, &all, &mut colors);
    colors
}

/// Runs the distributed loop over in-process ranks, one [`LocalGraph`] per rank.
///
/// # Errors
/// - [`ColoringError::InvalidConfig`] if `locals` does not have one entry per rank
/// - any layout, communication or coloring error, preferring the first rank's root cause
pub fn color_cluster<O>(
    ownership: &O,
    locals: &[LocalGraph],
    config: &ColoringConfig,
) -> Result<Vec<ColoringOutcome>>
where
    O: OwnershipMap + Sync,
{
    let ranks = ownership.num_ranks();
    if locals.len() != ranks {
        return Err(ColoringError::InvalidConfig(format!(
            "{} local graphs for {ranks} ranks",
            locals.len()
        )));
    }
    config.validate()?;
    LocalCluster::new(ranks).try_run(|comm| {
        let layout = VertexLayout::build(comm.rank(), &locals[comm.rank()], ownership)?;
        DistributedColoring::new(&layout, config.clone())?.run(&comm)
    })
}
