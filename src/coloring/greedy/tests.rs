//! Tests for the first-fit kernels.

use super::*;
use crate::graph::generators::{self, GlobalAdjacency};

fn csr(adj: &GlobalAdjacency) -> CsrAdjacency {
    let rows: Vec<Vec<usize>> = adj
        .iter()
        .map(|nbrs| nbrs.iter().map(|&g| g as usize).collect())
        .collect();
    CsrAdjacency::from_adjacency(&rows)
}

fn kernels() -> [&'static dyn ColoringStrategy; 3] {
    [&SequentialGreedy, &EdgeBasedGreedy, &BitwiseGreedy]
}

fn assert_proper(adj: &CsrAdjacency, colors: &[Color]) {
    for v in 0..adj.vertex_count() {
        assert_ne!(colors[v], UNCOLORED, "vertex {v} uncolored");
        for &u in adj.neighbors(v) {
            assert_ne!(colors[u], colors[v], "edge {u}-{v} shares color {}", colors[v]);
        }
    }
}

#[test]
fn path_of_five_alternates() {
    let adj = csr(&generators::path(5));
    for kernel in kernels() {
        let mut colors = vec![UNCOLORED; 5];
        let all: Vec<usize> = (0..5).collect();
        kernel.color_subset(&adj, &all, &mut colors);
        assert_eq!(colors, vec![1, 2, 1, 2, 1], "{}", kernel.name());
    }
}

#[test]
fn every_kernel_is_proper_and_within_degree_bound() {
    let graphs = [
        generators::cycle(9),
        generators::grid(6, 7),
        generators::complete(6),
        generators::random(120, 400, 17),
        generators::empty(4),
    ];
    for g in &graphs {
        let adj = csr(g);
        let all: Vec<usize> = (0..adj.vertex_count()).collect();
        for kernel in kernels() {
            let mut colors = vec![UNCOLORED; adj.vertex_count()];
            kernel.color_subset(&adj, &all, &mut colors);
            assert_proper(&adj, &colors);
            let used = colors.iter().copied().max().unwrap_or(0) as usize;
            assert!(used <= adj.max_degree() + 1, "{} used {used} colors", kernel.name());
        }
    }
}

#[test]
fn subset_recolor_leaves_other_vertices_alone() {
    let adj = csr(&generators::grid(4, 4));
    for kernel in kernels() {
        let mut colors = vec![UNCOLORED; 16];
        let all: Vec<usize> = (0..16).collect();
        kernel.color_subset(&adj, &all, &mut colors);
        let before = colors.clone();

        // Force a clash, then recolor only the clashing vertex.
        colors[5] = colors[6];
        kernel.color_subset(&adj, &[5], &mut colors);

        for v in (0..16).filter(|&v| v != 5) {
            assert_eq!(colors[v], before[v]);
        }
        assert_proper(&adj, &colors);
    }
}

#[test]
fn bitwise_crosses_window_boundary() {
    let adj = csr(&generators::complete(70));
    let all: Vec<usize> = (0..70).collect();
    let mut colors = vec![UNCOLORED; 70];
    BitwiseGreedy.color_subset(&adj, &all, &mut colors);
    let mut sorted = colors.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (1..=70).collect::<Vec<Color>>());
}

#[test]
fn duplicate_subset_entries_are_harmless() {
    let adj = csr(&generators::cycle(4));
    for kernel in [&EdgeBasedGreedy as &dyn ColoringStrategy, &BitwiseGreedy] {
        let mut colors = vec![UNCOLORED; 4];
        kernel.color_subset(&adj, &[0, 1, 1, 2, 3, 0], &mut colors);
        assert_proper(&adj, &colors);
    }
}

#[test]
fn speculative_kernels_agree() {
    // Several blocks, so the cross-block conflict passes run too.
    let adj = csr(&generators::random(2000, 9000, 4));
    let all: Vec<usize> = (0..2000).collect();
    let mut a = vec![UNCOLORED; 2000];
    let mut b = vec![UNCOLORED; 2000];
    EdgeBasedGreedy.color_subset(&adj, &all, &mut a);
    BitwiseGreedy.color_subset(&adj, &all, &mut b);
    // Same blocks, same priority rule and same first-fit answer.
    assert_eq!(a, b);
    assert_proper(&adj, &a);
}

fn count_passes(adj: &CsrAdjacency, first_fit: FirstFit, conflicts: ConflictPass) -> usize {
    let all: Vec<usize> = (0..adj.vertex_count()).collect();
    let mut colors = vec![UNCOLORED; adj.vertex_count()];
    let passes = speculate(adj, &all, &mut colors, first_fit, conflicts);
    assert_proper(adj, &colors);
    passes
}

#[test]
fn long_path_settles_in_a_constant_number_of_passes() {
    let adj = csr(&generators::path(100_000));
    assert!(count_passes(&adj, first_fit_sorted, edge_conflicts) <= 2);
    assert!(count_passes(&adj, first_fit_bitwise, vertex_conflicts) <= 2);
}

#[test]
fn row_major_grid_does_not_sweep_row_by_row() {
    // Rows are wider than a block, so every vertical edge crosses blocks.
    let adj = csr(&generators::grid(300, 300));
    assert!(count_passes(&adj, first_fit_sorted, edge_conflicts) <= 8);
    assert!(count_passes(&adj, first_fit_bitwise, vertex_conflicts) <= 8);
}

#[test]
fn path_spread_across_blocks_converges_quickly() {
    // Consecutive path vertices live in different blocks with increasing
    // indices, the worst case for an index-ordered retry rule.
    let blocks = 80;
    let n = BLOCK * blocks;
    let index = |p: usize| (p % blocks) * BLOCK + p / blocks;
    let mut rows = vec![Vec::new(); n];
    for p in 1..n {
        let (u, v) = (index(p - 1), index(p));
        rows[u].push(v);
        rows[v].push(u);
    }
    let adj = CsrAdjacency::from_adjacency(&rows);
    assert!(count_passes(&adj, first_fit_sorted, edge_conflicts) <= 8);
    assert!(count_passes(&adj, first_fit_bitwise, vertex_conflicts) <= 8);
}

#[test]
fn first_fit_variants_agree() {
    for used in [vec![], vec![1, 1, 3], vec![2, 3], (1..=64).collect::<Vec<Color>>()] {
        let mut a = used.clone();
        let mut b = used.clone();
        assert_eq!(first_fit_sorted(&mut a), first_fit_bitwise(&mut b), "{used:?}");
    }
    assert_eq!(first_fit_sorted(&mut [1, 1, 3]), 2);
    assert_eq!(first_fit_bitwise(&mut (1..=64).collect::<Vec<Color>>()), 65);
}
