//! Error type shared by every layer of the coloring engine.

use crate::GlobalId;

/// Errors produced while building layouts, exchanging colors, or running the
/// speculate-and-recolor loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColoringError {
    /// CSR offsets/neighbors are inconsistent.
    MalformedAdjacency(String),
    /// An owned global id appears more than once on the same rank.
    DuplicateVertex(GlobalId),
    /// A vertex listed as owned is mapped to a different rank by the ownership map.
    NotOwned {
        /// The offending global id.
        gid: GlobalId,
        /// Rank that listed the vertex as owned.
        rank: usize,
        /// Rank the ownership map assigns it to.
        owner: usize,
    },
    /// A neighbor global id has no owner in the ownership map.
    UnknownVertex(GlobalId),
    /// The ownership map names a rank outside `0..size`.
    RankOutOfRange {
        /// Reported rank.
        rank: usize,
        /// Communicator size.
        size: usize,
    },
    /// The layout was built for a different rank or communicator size.
    CommunicatorMismatch {
        /// `(rank, size)` the layout was built for.
        layout: (usize, usize),
        /// `(rank, size)` of the communicator.
        comm: (usize, usize),
    },
    /// A received update names a global id this rank does not ghost.
    UnknownGhost(GlobalId),
    /// A peer rank exited before contributing to a collective.
    PeerDisconnected {
        /// Waiting rank.
        rank: usize,
        /// Rank that went away.
        peer: usize,
    },
    /// A message buffer could not be decoded.
    MalformedMessage(String),
    /// Configuration rejected by [`ColoringConfig::validate`](crate::ColoringConfig::validate).
    InvalidConfig(String),
    /// The configured round cap was reached with conflicts outstanding.
    RoundLimitExceeded {
        /// Rounds completed.
        rounds: usize,
        /// Conflicts still reported globally.
        conflicts: u64,
    },
    /// Post-run validation found adjacent vertices sharing a color, or uncolored vertices.
    InvalidColoring {
        /// Conflicting edges observed across all ranks.
        conflicts: u64,
        /// Owned vertices left at the uncolored sentinel across all ranks.
        uncolored: u64,
    },
    /// A rank thread panicked inside a [`LocalCluster`](crate::comm::LocalCluster).
    RankPanicked(usize),
}

impl core::fmt::Display for ColoringError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MalformedAdjacency(msg) => write!(f, "malformed adjacency: {msg}"),
            Self::DuplicateVertex(gid) => {
                write!(f, "vertex {gid} is listed as owned more than once")
            }
            Self::NotOwned { gid, rank, owner } => {
                write!(f, "vertex {gid} listed on rank {rank} but owned by rank {owner}")
            }
            Self::UnknownVertex(gid) => write!(f, "vertex {gid} has no owner"),
            Self::RankOutOfRange { rank, size } => {
                write!(f, "rank {rank} is out of range for communicator of size {size}")
            }
            Self::CommunicatorMismatch { layout, comm } => write!(
                f,
                "layout built for rank {} of {} but communicator is rank {} of {}",
                layout.0, layout.1, comm.0, comm.1
            ),
            Self::UnknownGhost(gid) => {
                write!(f, "received update for vertex {gid}, which is not a ghost here")
            }
            Self::PeerDisconnected { rank, peer } => {
                write!(f, "rank {rank} lost peer {peer} during a collective")
            }
            Self::MalformedMessage(msg) => write!(f, "malformed message: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::RoundLimitExceeded { rounds, conflicts } => write!(
                f,
                "coloring did not converge after {rounds} rounds \
                 ({conflicts} conflicts outstanding)"
            ),
            Self::InvalidColoring { conflicts, uncolored } => write!(
                f,
                "invalid coloring: {conflicts} conflicting edges, {uncolored} uncolored vertices"
            ),
            Self::RankPanicked(rank) => write!(f, "rank {rank} panicked"),
        }
    }
}

impl std::error::Error for ColoringError {}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, ColoringError>;
