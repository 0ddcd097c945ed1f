//! First-fit greedy kernels.
//!
//! - [`SequentialGreedy`]: in-order first-fit, the reference colorer
//! - [`EdgeBasedGreedy`]: speculative first-fit, conflicts found by an edge-list pass
//! - [`BitwiseGreedy`]: speculative first-fit over 64-color bitmask windows
//!
//! The speculative kernels split the pending vertices into fixed blocks of
//! consecutive indices. Blocks run in parallel; inside a block vertices are
//! colored in order and see the colors chosen earlier in the same block, so
//! only edges between blocks can clash. Every clashing edge is then settled
//! by a hash priority on the local index: the lower-priority endpoint is
//! uncolored and retried in the next pass. The highest-priority pending
//! vertex always keeps its color, and because priorities do not follow the
//! index order, retries do not form long chains along naturally ordered
//! inputs. Block boundaries are fixed, so the result does not depend on how
//! many threads ran the pass.

use core::sync::atomic::Ordering;

use super::strategy::ColoringStrategy;
use super::tiebreak::mix64;
use crate::concurrency::parallel::{for_each, map_blocks, map_each};
use crate::concurrency::AtomicBitset;
use crate::graph::CsrAdjacency;
use crate::{Color, UNCOLORED};

/// Pending vertices colored sequentially by one task.
const BLOCK: usize = 256;

/// Picks the smallest color missing from the neighbor colors in `used`.
type FirstFit = fn(&mut [Color]) -> Color;

/// Returns the pending vertices that must retry.
type ConflictPass = fn(&CsrAdjacency, &[usize], &AtomicBitset, &[Color]) -> Vec<usize>;

/// In-order first-fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialGreedy;

impl ColoringStrategy for SequentialGreedy {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn color_subset(&self, adjacency: &CsrAdjacency, subset: &[usize], colors: &mut [Color]) {
        for &v in subset {
            colors[v] = UNCOLORED;
        }
        // `forbidden[c] == i` marks color `c` as taken for the i-th subset vertex.
        let mut forbidden = vec![usize::MAX; adjacency.max_degree() + 2];
        for (i, &v) in subset.iter().enumerate() {
            for &u in adjacency.neighbors(v) {
                let c = colors[u] as usize;
                if c != 0 && c < forbidden.len() {
                    forbidden[c] = i;
                }
            }
            let c = (1..forbidden.len())
                .find(|&c| forbidden[c] != i)
                .unwrap_or(forbidden.len());
            colors[v] = to_color(c);
        }
    }
}

/// Speculative first-fit whose conflict pass walks the pending-pending edge list.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeBasedGreedy;

impl ColoringStrategy for EdgeBasedGreedy {
    fn name(&self) -> &'static str {
        "edge-based"
    }

    fn color_subset(&self, adjacency: &CsrAdjacency, subset: &[usize], colors: &mut [Color]) {
        speculate(adjacency, subset, colors, first_fit_sorted, edge_conflicts);
    }
}

/// Speculative first-fit tracking forbidden colors in 64-bit windows.
///
/// Cheapest when few vertices are recolored and degrees are moderate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitwiseGreedy;

impl ColoringStrategy for BitwiseGreedy {
    fn name(&self) -> &'static str {
        "bitwise"
    }

    fn color_subset(&self, adjacency: &CsrAdjacency, subset: &[usize], colors: &mut [Color]) {
        speculate(adjacency, subset, colors, first_fit_bitwise, vertex_conflicts);
    }
}

/// Runs block-colored passes until no pending vertex remains; returns the pass count.
fn speculate(
    adjacency: &CsrAdjacency,
    subset: &[usize],
    colors: &mut [Color],
    first_fit: FirstFit,
    conflicts: ConflictPass,
) -> usize {
    let mut pending = subset.to_vec();
    pending.sort_unstable();
    pending.dedup();
    for &v in &pending {
        colors[v] = UNCOLORED;
    }

    let active = AtomicBitset::new(colors.len());
    let mut passes = 0;
    while !pending.is_empty() {
        passes += 1;
        let tentative = {
            let snapshot: &[Color] = colors;
            map_blocks(&pending, BLOCK, |block| {
                color_block(adjacency, block, snapshot, first_fit)
            })
        };
        active.clear_all();
        for (&v, c) in pending.iter().zip(tentative) {
            colors[v] = c;
            active.test_and_set(v, Ordering::Relaxed);
        }

        let retry = conflicts(adjacency, &pending, &active, colors);
        for &v in &retry {
            colors[v] = UNCOLORED;
        }
        pending = retry;
    }
    passes
}

/// Colors a sorted block in order. Neighbors earlier in the block use the
/// color just chosen; everything else comes from the pass snapshot, where
/// pending vertices are uncolored.
fn color_block(
    adjacency: &CsrAdjacency,
    block: &[usize],
    snapshot: &[Color],
    first_fit: FirstFit,
) -> Vec<Color> {
    let mut chosen: Vec<Color> = Vec::with_capacity(block.len());
    let mut used: Vec<Color> = Vec::new();
    for &v in block {
        used.clear();
        for &u in adjacency.neighbors(v) {
            let c = match block.binary_search(&u) {
                Ok(j) if j < chosen.len() => chosen[j],
                _ => snapshot[u],
            };
            if c != UNCOLORED {
                used.push(c);
            }
        }
        chosen.push(first_fit(&mut used));
    }
    chosen
}

/// Returns `true` if `v` gives up its color in a clash with `u`.
#[inline]
fn yields(v: usize, u: usize) -> bool {
    (mix64(v as u64), v) < (mix64(u as u64), u)
}

fn edge_conflicts(
    adjacency: &CsrAdjacency,
    pending: &[usize],
    active: &AtomicBitset,
    colors: &[Color],
) -> Vec<usize> {
    let edges: Vec<(usize, usize)> = map_each(pending, |v| {
        adjacency
            .neighbors(v)
            .iter()
            .filter(|&&u| u < v && active.is_set(u))
            .map(|&u| (u, v))
            .collect::<Vec<_>>()
    })
    .into_iter()
    .flatten()
    .collect();

    let lost = AtomicBitset::new(colors.len());
    for_each(&edges, |&(u, v)| {
        if colors[u] == colors[v] {
            let loser = if yields(v, u) { v } else { u };
            lost.test_and_set(loser, Ordering::Relaxed);
        }
    });
    pending.iter().copied().filter(|&v| lost.is_set(v)).collect()
}

fn vertex_conflicts(
    adjacency: &CsrAdjacency,
    pending: &[usize],
    active: &AtomicBitset,
    colors: &[Color],
) -> Vec<usize> {
    let retry = map_each(pending, |v| {
        adjacency
            .neighbors(v)
            .iter()
            .any(|&u| active.is_set(u) && colors[u] == colors[v] && yields(v, u))
    });
    pending
        .iter()
        .zip(retry)
        .filter_map(|(&v, r)| r.then_some(v))
        .collect()
}

/// Smallest color not present in `used`, via sorting.
fn first_fit_sorted(used: &mut [Color]) -> Color {
    used.sort_unstable();
    let mut candidate: Color = 1;
    for &c in used.iter() {
        if c == candidate {
            candidate += 1;
        } else if c > candidate {
            break;
        }
    }
    candidate
}

/// Smallest color not present in `used`, 64 colors per window.
fn first_fit_bitwise(used: &mut [Color]) -> Color {
    let mut base: Color = 0;
    loop {
        let mut mask = 0u64;
        for &c in used.iter() {
            if c > base && c <= base + 64 {
                mask |= 1u64 << (c - base - 1);
            }
        }
        if mask != u64::MAX {
            return base + mask.trailing_ones() + 1;
        }
        base += 64;
    }
}

#[inline]
fn to_color(c: usize) -> Color {
    Color::try_from(c).unwrap_or(Color::MAX)
}

#[cfg(test)]
mod tests;
