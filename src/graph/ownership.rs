//! Global id → owning rank maps.
//!
//! The engine only needs the owner of each ghost to pick a message
//! destination; the local index on the owner is resolved by the receiver.

use std::collections::HashMap;

use crate::GlobalId;

/// Maps global vertex ids to the rank that owns them.
pub trait OwnershipMap {
    /// Owner of `gid`, or `None` if the id is not part of the graph.
    fn owner_of(&self, gid: GlobalId) -> Option<usize>;

    /// Number of ranks the map distributes over.
    fn num_ranks(&self) -> usize;
}

/// Contiguous block distribution: rank `r` owns `[starts[r], starts[r + 1])`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOwnership {
    starts: Vec<GlobalId>,
}

impl BlockOwnership {
    /// Builds a block map from per-rank vertex counts.
    pub fn from_counts(counts: &[usize]) -> Self {
        let mut starts = Vec::with_capacity(counts.len() + 1);
        let mut next: GlobalId = 0;
        starts.push(next);
        for &c in counts {
            next += c as GlobalId;
            starts.push(next);
        }
        Self { starts }
    }

    /// Splits `n` vertices over `ranks` ranks; the first `n % ranks` ranks get one extra.
    ///
    /// # Panics
    /// Panics if `ranks == 0`.
    pub fn even(n: usize, ranks: usize) -> Self {
        assert!(ranks != 0, "ranks must be > 0");
        let base = n / ranks;
        let extra = n % ranks;
        let counts: Vec<usize> = (0..ranks).map(|r| base + usize::from(r < extra)).collect();
        Self::from_counts(&counts)
    }

    /// Global ids owned by `rank`.
    pub fn range(&self, rank: usize) -> core::ops::Range<GlobalId> {
        self.starts[rank]..self.starts[rank + 1]
    }

    /// Total vertex count.
    pub fn global_count(&self) -> usize {
        self.starts.last().copied().unwrap_or(0) as usize
    }
}

impl OwnershipMap for BlockOwnership {
    fn owner_of(&self, gid: GlobalId) -> Option<usize> {
        if gid >= *self.starts.last()? {
            return None;
        }
        // First start strictly greater than gid, minus one. Empty ranks share a
        // start with their successor, so this lands on the non-empty one.
        let idx = self.starts.partition_point(|&s| s <= gid);
        Some(idx - 1)
    }

    fn num_ranks(&self) -> usize {
        self.starts.len().saturating_sub(1)
    }
}

/// Arbitrary assignment, e.g. the output of an external partitioner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitOwnership {
    owners: HashMap<GlobalId, usize>,
    ranks: usize,
}

impl ExplicitOwnership {
    /// Creates an empty map over `ranks` ranks.
    pub fn new(ranks: usize) -> Self {
        Self {
            owners: HashMap::new(),
            ranks,
        }
    }

    /// Assigns `gid` to `rank`, replacing any earlier assignment.
    pub fn assign(&mut self, gid: GlobalId, rank: usize) {
        self.owners.insert(gid, rank);
    }

    /// Number of assigned vertices.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns `true` if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl FromIterator<(GlobalId, usize)> for ExplicitOwnership {
    fn from_iter<I: IntoIterator<Item = (GlobalId, usize)>>(iter: I) -> Self {
        let owners: HashMap<GlobalId, usize> = iter.into_iter().collect();
        let ranks = owners.values().copied().max().map_or(0, |r| r + 1);
        Self { owners, ranks }
    }
}

impl OwnershipMap for ExplicitOwnership {
    fn owner_of(&self, gid: GlobalId) -> Option<usize> {
        self.owners.get(&gid).copied()
    }

    fn num_ranks(&self) -> usize {
        self.ranks
    }
}
