//! Owned/ghost vertex layout for one rank.
//!
//! A single local index space covers both kinds of vertices:
//! owned vertices occupy `[0, n_owned)` in input order and ghosts occupy
//! `[n_owned, n_owned + n_ghost)` in first-seen order. Everything the engine
//! stores per vertex (colors, flags) is indexed by this space, so no
//! per-vertex pointers or maps are needed on the hot path.
//!
//! The layout is built once and is immutable for the run.

use std::collections::HashMap;

use crate::error::{ColoringError, Result};
use crate::graph::csr::CsrAdjacency;
use crate::graph::ownership::OwnershipMap;
use crate::GlobalId;

/// The part of the input graph one rank is responsible for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalGraph {
    /// Owned global ids.
    pub owned: Vec<GlobalId>,
    /// Neighbor global ids for each entry of `owned`.
    pub adjacency: Vec<Vec<GlobalId>>,
}

impl LocalGraph {
    /// Creates an empty local graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an owned vertex with its neighbor list.
    pub fn push_vertex(&mut self, gid: GlobalId, neighbors: Vec<GlobalId>) {
        self.owned.push(gid);
        self.adjacency.push(neighbors);
    }

    /// Number of owned vertices.
    pub fn len(&self) -> usize {
        self.owned.len()
    }

    /// Returns `true` if this rank owns nothing.
    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }
}

/// Immutable owned/ghost index space plus the communication plan derived from it.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    rank: usize,
    size: usize,
    n_owned: usize,
    local_to_gid: Vec<GlobalId>,
    gid_to_local: HashMap<GlobalId, usize>,
    ghost_owner: Vec<usize>,
    adjacency: CsrAdjacency,
    boundary: Vec<usize>,
    is_boundary: Vec<bool>,
    holder_offsets: Vec<usize>,
    holders: Vec<usize>,
    peers: Vec<usize>,
}

impl VertexLayout {
    /// Builds the layout for `rank`.
    ///
    /// Self loops are dropped, duplicate edges are merged and owned-owned
    /// edges are symmetrized.
    ///
    /// # Errors
    /// - [`ColoringError::RankOutOfRange`] if `rank` or an owner is outside the map's ranks
    /// - [`ColoringError::MalformedAdjacency`] if `owned` and `adjacency` lengths differ
    /// - [`ColoringError::DuplicateVertex`] if an owned id repeats
    /// - [`ColoringError::NotOwned`] if an owned id maps to another rank
    /// - [`ColoringError::UnknownVertex`] if a neighbor id has no owner, or maps to
    ///   this rank without being listed as owned
    pub fn build(rank: usize, graph: &LocalGraph, ownership: &impl OwnershipMap) -> Result<Self> {
        let size = ownership.num_ranks();
        if rank >= size {
            return Err(ColoringError::RankOutOfRange { rank, size });
        }
        if graph.owned.len() != graph.adjacency.len() {
            return Err(ColoringError::MalformedAdjacency(format!(
                "{} owned vertices but {} adjacency rows",
                graph.owned.len(),
                graph.adjacency.len()
            )));
        }

        let n_owned = graph.owned.len();
        let mut gid_to_local = HashMap::with_capacity(n_owned);
        let mut local_to_gid = Vec::with_capacity(n_owned);

        for &gid in &graph.owned {
            let owner = ownership.owner_of(gid).ok_or(ColoringError::UnknownVertex(gid))?;
            if owner != rank {
                return Err(ColoringError::NotOwned { gid, rank, owner });
            }
            if gid_to_local.insert(gid, local_to_gid.len()).is_some() {
                return Err(ColoringError::DuplicateVertex(gid));
            }
            local_to_gid.push(gid);
        }

        let mut ghost_owner = Vec::new();
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); n_owned];

        for (u, nbrs) in graph.adjacency.iter().enumerate() {
            let u_gid = local_to_gid[u];
            for &gid in nbrs {
                if gid == u_gid {
                    continue;
                }
                let v = match gid_to_local.get(&gid) {
                    Some(&v) => v,
                    None => {
                        let owner = ownership
                            .owner_of(gid)
                            .ok_or(ColoringError::UnknownVertex(gid))?;
                        if owner >= size {
                            return Err(ColoringError::RankOutOfRange { rank: owner, size });
                        }
                        if owner == rank {
                            return Err(ColoringError::UnknownVertex(gid));
                        }
                        let v = local_to_gid.len();
                        gid_to_local.insert(gid, v);
                        local_to_gid.push(gid);
                        ghost_owner.push(owner);
                        rows.push(Vec::new());
                        v
                    }
                };
                rows[u].push(v);
                rows[v].push(u);
            }
        }

        for row in &mut rows {
            row.sort_unstable();
            row.dedup();
        }
        let adjacency = CsrAdjacency::from_adjacency(&rows);

        let mut boundary = Vec::new();
        let mut is_boundary = vec![false; n_owned];
        let mut holder_offsets = Vec::with_capacity(n_owned + 1);
        let mut holders = Vec::new();
        let mut peers = Vec::new();
        holder_offsets.push(0);

        let mut ranks = Vec::new();
        for u in 0..n_owned {
            ranks.clear();
            ranks.extend(
                adjacency
                    .neighbors(u)
                    .iter()
                    .filter(|&&v| v >= n_owned)
                    .map(|&v| ghost_owner[v - n_owned]),
            );
            if !ranks.is_empty() {
                ranks.sort_unstable();
                ranks.dedup();
                holders.extend_from_slice(&ranks);
                peers.extend_from_slice(&ranks);
                boundary.push(u);
                is_boundary[u] = true;
            }
            holder_offsets.push(holders.len());
        }
        peers.sort_unstable();
        peers.dedup();

        Ok(Self {
            rank,
            size,
            n_owned,
            local_to_gid,
            gid_to_local,
            ghost_owner,
            adjacency,
            boundary,
            is_boundary,
            holder_offsets,
            holders,
            peers,
        })
    }

    /// Rank this layout belongs to.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of ranks in the ownership map.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of owned vertices.
    #[inline]
    pub fn owned_count(&self) -> usize {
        self.n_owned
    }

    /// Number of ghost vertices.
    #[inline]
    pub fn ghost_count(&self) -> usize {
        self.local_to_gid.len() - self.n_owned
    }

    /// Owned plus ghost.
    #[inline]
    pub fn local_count(&self) -> usize {
        self.local_to_gid.len()
    }

    /// Global id of local index `v`.
    #[inline]
    pub fn gid(&self, v: usize) -> GlobalId {
        self.local_to_gid[v]
    }

    /// Global ids in local order.
    #[inline]
    pub fn gids(&self) -> &[GlobalId] {
        &self.local_to_gid
    }

    /// Local index of `gid`, if it is owned or ghosted here.
    #[inline]
    pub fn local_of(&self, gid: GlobalId) -> Option<usize> {
        self.gid_to_local.get(&gid).copied()
    }

    /// Returns `true` for indices in the ghost range.
    #[inline]
    pub fn is_ghost(&self, v: usize) -> bool {
        v >= self.n_owned
    }

    /// Owner rank of a ghost index, `None` for owned indices.
    #[inline]
    pub fn ghost_owner(&self, v: usize) -> Option<usize> {
        v.checked_sub(self.n_owned).map(|g| self.ghost_owner[g])
    }

    /// Adjacency over the local index space.
    #[inline]
    pub fn adjacency(&self) -> &CsrAdjacency {
        &self.adjacency
    }

    /// Owned vertices with at least one ghost neighbor, ascending.
    #[inline]
    pub fn boundary(&self) -> &[usize] {
        &self.boundary
    }

    /// Returns `true` if owned vertex `v` has a ghost neighbor.
    #[inline]
    pub fn is_boundary(&self, v: usize) -> bool {
        self.is_boundary.get(v).copied().unwrap_or(false)
    }

    /// Sorted ranks holding a ghost copy of owned vertex `v`; empty for interior vertices.
    #[inline]
    pub fn ghost_holders(&self, v: usize) -> &[usize] {
        &self.holders[self.holder_offsets[v]..self.holder_offsets[v + 1]]
    }

    /// Sorted ranks this rank exchanges ghosts with.
    #[inline]
    pub fn peers(&self) -> &[usize] {
        &self.peers
    }
}
