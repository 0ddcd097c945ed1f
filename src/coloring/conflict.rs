//! Cross-rank conflict detection.
//!
//! Every cross-rank edge is stored as a ghost row entry, so scanning the ghost
//! rows examines each (owned, ghost) pair exactly once, which covers both the
//! ghost side and the owned side of the boundary. Decisions are taken against
//! the colors as they were when the scan started: the owner of each endpoint
//! sees the same two colors after an exchange, so both ranks reach the same
//! verdict for every pair.

use core::sync::atomic::Ordering;

use super::state::GhostedColors;
use super::tiebreak::TieBreak;
use crate::concurrency::parallel::sum_range;
use crate::concurrency::AtomicBitset;
use crate::graph::VertexLayout;
use crate::UNCOLORED;

/// Result of one conflict scan on one rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictScan {
    /// Local indices reset to the uncolored sentinel, ascending. Owned entries are
    /// always boundary vertices; ghost entries are local guesses the owner will
    /// overwrite.
    pub worklist: Vec<usize>,
    /// Same-colored cross-rank edges observed.
    pub conflicts: usize,
}

impl ConflictScan {
    /// Owned entries of the worklist.
    pub fn owned<'a>(&'a self, layout: &'a VertexLayout) -> impl Iterator<Item = usize> + 'a {
        self.worklist.iter().copied().filter(move |&v| !layout.is_ghost(v))
    }
}

/// Finds same-colored cross-rank edges, resets every loser to uncolored and
/// returns them as the recolor worklist.
pub fn detect_conflicts(
    layout: &VertexLayout,
    colors: &mut GhostedColors,
    tiebreak: &TieBreak,
) -> ConflictScan {
    let n_owned = layout.owned_count();
    let adj = layout.adjacency();
    let lost = AtomicBitset::new(layout.local_count());

    let conflicts = {
        let snapshot = colors.as_slice();
        sum_range(layout.ghost_count(), |i| {
            let g = n_owned + i;
            let cg = snapshot[g];
            if cg == UNCOLORED {
                return 0;
            }
            let mut found = 0;
            for &u in adj.neighbors(g) {
                if snapshot[u] != cg {
                    continue;
                }
                found += 1;
                let loser = if tiebreak.keeps(layout.gid(g), layout.gid(u)) { u } else { g };
                lost.test_and_set(loser, Ordering::Relaxed);
            }
            found
        })
    };

    let worklist: Vec<usize> = lost.iter_ones().collect();
    for &v in &worklist {
        colors.set(v, UNCOLORED);
    }
    ConflictScan { worklist, conflicts }
}

/// Counts same-colored edges and uncolored owned vertices without modifying anything.
///
/// Owned-owned edges are counted once; cross-rank edges once per rank that sees them.
pub fn count_violations(layout: &VertexLayout, colors: &GhostedColors) -> (usize, usize) {
    let adj = layout.adjacency();
    let colors = colors.as_slice();
    let n_owned = layout.owned_count();
    let mut conflicts = 0;
    let mut uncolored = 0;
    for v in 0..n_owned {
        if colors[v] == UNCOLORED {
            uncolored += 1;
            continue;
        }
        for &u in adj.neighbors(v) {
            if (u > v || u >= n_owned) && colors[u] == colors[v] {
                conflicts += 1;
            }
        }
    }
    (conflicts, uncolored)
}
