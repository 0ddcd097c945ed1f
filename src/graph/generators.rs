//! Small graph builders for tests, benchmarks and demos.
//!
//! Graphs are returned as symmetric global adjacency lists indexed by global id.

use crate::coloring::tiebreak::mix64;
use crate::graph::layout::LocalGraph;
use crate::graph::ownership::{BlockOwnership, ExplicitOwnership};
use crate::GlobalId;

/// Symmetric adjacency lists indexed by global id.
pub type GlobalAdjacency = Vec<Vec<GlobalId>>;

/// `n` isolated vertices.
pub fn empty(n: usize) -> GlobalAdjacency {
    vec![Vec::new(); n]
}

/// Path `0 - 1 - ... - (n-1)`.
pub fn path(n: usize) -> GlobalAdjacency {
    let mut adj = empty(n);
    for v in 1..n {
        link(&mut adj, v - 1, v);
    }
    adj
}

/// Cycle on `n` vertices (a path for `n < 3`).
pub fn cycle(n: usize) -> GlobalAdjacency {
    let mut adj = path(n);
    if n >= 3 {
        link(&mut adj, n - 1, 0);
    }
    adj
}

/// Complete graph on `n` vertices.
pub fn complete(n: usize) -> GlobalAdjacency {
    let mut adj = empty(n);
    for u in 0..n {
        for v in (u + 1)..n {
            link(&mut adj, u, v);
        }
    }
    adj
}

/// `rows x cols` 4-neighbor grid, row-major ids.
pub fn grid(rows: usize, cols: usize) -> GlobalAdjacency {
    let mut adj = empty(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let v = r * cols + c;
            if c + 1 < cols {
                link(&mut adj, v, v + 1);
            }
            if r + 1 < rows {
                link(&mut adj, v, v + cols);
            }
        }
    }
    adj
}

/// Deterministic G(n, m)-style graph: `edges` distinct random pairs drawn from `seed`.
pub fn random(n: usize, edges: usize, seed: u64) -> GlobalAdjacency {
    let mut adj = empty(n);
    if n < 2 {
        return adj;
    }
    let max_edges = n * (n - 1) / 2;
    let target = edges.min(max_edges);
    let mut placed = 0;
    let mut state = seed;
    while placed < target {
        state = mix64(state.wrapping_add(0x9E37_79B9_7F4A_7C15));
        let u = (state % n as u64) as usize;
        state = mix64(state.wrapping_add(0x9E37_79B9_7F4A_7C15));
        let v = (state % n as u64) as usize;
        if u == v || adj[u].contains(&(v as GlobalId)) {
            continue;
        }
        link(&mut adj, u, v);
        placed += 1;
    }
    adj
}

/// Largest vertex degree.
pub fn max_degree(adj: &GlobalAdjacency) -> usize {
    adj.iter().map(Vec::len).max().unwrap_or(0)
}

/// Splits a global graph into contiguous blocks, one per rank.
pub fn partition_blocks(adj: &GlobalAdjacency, ranks: usize) -> (BlockOwnership, Vec<LocalGraph>) {
    let ownership = BlockOwnership::even(adj.len(), ranks);
    let locals = (0..ranks)
        .map(|r| {
            let mut local = LocalGraph::new();
            for gid in ownership.range(r) {
                local.push_vertex(gid, adj[gid as usize].clone());
            }
            local
        })
        .collect();
    (ownership, locals)
}

/// Splits a global graph by an explicit owner per vertex.
///
/// # Panics
/// Panics if `owners.len() != adj.len()` or an owner is `>= ranks`.
pub fn partition_by_owner(
    adj: &GlobalAdjacency,
    owners: &[usize],
    ranks: usize,
) -> (ExplicitOwnership, Vec<LocalGraph>) {
    assert_eq!(owners.len(), adj.len(), "one owner per vertex");
    let mut ownership = ExplicitOwnership::new(ranks);
    let mut locals = vec![LocalGraph::new(); ranks];
    for (gid, (&owner, nbrs)) in owners.iter().zip(adj).enumerate() {
        assert!(owner < ranks, "owner {owner} out of range");
        ownership.assign(gid as GlobalId, owner);
        locals[owner].push_vertex(gid as GlobalId, nbrs.clone());
    }
    (ownership, locals)
}

fn link(adj: &mut GlobalAdjacency, u: usize, v: usize) {
    adj[u].push(v as GlobalId);
    adj[v].push(u as GlobalId);
}
