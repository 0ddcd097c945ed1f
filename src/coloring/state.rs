//! The distributed vertex-state container.
//!
//! One contiguous color array per rank, split by the layout into an owned
//! slice `[0, n_owned)` that only this rank writes and a ghost slice
//! `[n_owned, n_owned + n_ghost)` that mirrors remote owners. Ghost values are
//! authoritative only right after [`GhostedColors::push_owned_to_ghosts`].

use serde::{Deserialize, Serialize};

use crate::comm::{ColorUpdate, Communicator};
use crate::error::{ColoringError, Result};
use crate::graph::VertexLayout;
use crate::{Color, UNCOLORED};

/// Traffic produced by one ghost exchange on one rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeVolume {
    /// `(vertex, destination)` updates sent.
    pub updates_sent: usize,
    /// Updates received and applied.
    pub updates_received: usize,
    /// Payload bytes sent.
    pub bytes_sent: usize,
    /// Payload bytes received.
    pub bytes_received: usize,
    /// Ranks that were sent at least one update.
    pub peers_contacted: usize,
}

impl core::ops::AddAssign for ExchangeVolume {
    fn add_assign(&mut self, rhs: Self) {
        self.updates_sent += rhs.updates_sent;
        self.updates_received += rhs.updates_received;
        self.bytes_sent += rhs.bytes_sent;
        self.bytes_received += rhs.bytes_received;
        self.peers_contacted += rhs.peers_contacted;
    }
}

/// Owned + ghost colors for one rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostedColors {
    colors: Vec<Color>,
    n_owned: usize,
}

impl GhostedColors {
    /// All vertices uncolored.
    pub fn new(layout: &VertexLayout) -> Self {
        Self {
            colors: vec![UNCOLORED; layout.local_count()],
            n_owned: layout.owned_count(),
        }
    }

    /// Owned slice.
    #[inline]
    pub fn owned(&self) -> &[Color] {
        &self.colors[..self.n_owned]
    }

    /// Mutable owned slice.
    #[inline]
    pub fn owned_mut(&mut self) -> &mut [Color] {
        &mut self.colors[..self.n_owned]
    }

    /// Ghost slice.
    #[inline]
    pub fn ghosts(&self) -> &[Color] {
        &self.colors[self.n_owned..]
    }

    /// Whole local array.
    #[inline]
    pub fn as_slice(&self) -> &[Color] {
        &self.colors
    }

    /// Whole local array, for kernels that write owned and ghost slots.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Color] {
        &mut self.colors
    }

    /// Color of local index `v`.
    #[inline]
    pub fn get(&self, v: usize) -> Color {
        self.colors[v]
    }

    /// Sets the color of local index `v`.
    #[inline]
    pub fn set(&mut self, v: usize, color: Color) {
        self.colors[v] = color;
    }

    /// Consumes the container, keeping only owned colors.
    pub fn into_owned(mut self) -> Vec<Color> {
        self.colors.truncate(self.n_owned);
        self.colors
    }

    /// Sends owned colors to every rank holding a ghost copy and overwrites local
    /// ghost slots with what the owners sent.
    ///
    /// `dirty` restricts the send side to the listed local indices (non-boundary
    /// and ghost entries are skipped); `None` sends the whole boundary. Every rank
    /// must call this collectively.
    ///
    /// # Errors
    /// - [`ColoringError::CommunicatorMismatch`] if the layout belongs to another rank/size
    /// - [`ColoringError::UnknownGhost`] if a peer sends a vertex not ghosted here
    /// - any communicator failure
    pub fn push_owned_to_ghosts<C>(
        &mut self,
        comm: &C,
        layout: &VertexLayout,
        dirty: Option<&[usize]>,
    ) -> Result<ExchangeVolume>
    where
        C: Communicator + ?Sized,
    {
        check_layout(comm, layout)?;
        let size = comm.size();

        let mut volume = ExchangeVolume::default();
        let mut sends: Vec<Vec<u8>> = vec![Vec::new(); size];
        let send_set = dirty.unwrap_or(layout.boundary());
        for &v in send_set {
            if !layout.is_boundary(v) {
                continue;
            }
            let update = ColorUpdate::new(layout.gid(v), self.colors[v]);
            for &dest in layout.ghost_holders(v) {
                update.encode_into(&mut sends[dest]);
                volume.updates_sent += 1;
            }
        }
        volume.bytes_sent = sends.iter().map(Vec::len).sum();
        volume.peers_contacted = sends.iter().filter(|s| !s.is_empty()).count();

        let received = comm.all_to_all_v(sends)?;
        for buf in &received {
            volume.bytes_received += buf.len();
            for update in ColorUpdate::decode_all(buf)? {
                let gid = update.gid();
                match layout.local_of(gid) {
                    Some(v) if layout.is_ghost(v) => self.colors[v] = update.color(),
                    _ => return Err(ColoringError::UnknownGhost(gid)),
                }
                volume.updates_received += 1;
            }
        }

        tracing::trace!(
            rank = layout.rank(),
            sent = volume.updates_sent,
            received = volume.updates_received,
            "ghost exchange"
        );
        Ok(volume)
    }
}

pub(crate) fn check_layout<C>(comm: &C, layout: &VertexLayout) -> Result<()>
where
    C: Communicator + ?Sized,
{
    if comm.rank() == layout.rank() && comm.size() == layout.size() {
        Ok(())
    } else {
        Err(ColoringError::CommunicatorMismatch {
            layout: (layout.rank(), layout.size()),
            comm: (comm.rank(), comm.size()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::{LocalCluster, SingleRankComm};
    use crate::graph::generators;
    use crate::graph::ownership::BlockOwnership;
    use crate::graph::LocalGraph;

    #[test]
    fn slices_follow_layout() {
        let (ownership, locals) = generators::partition_blocks(&generators::path(4), 2);
        let layout = VertexLayout::build(0, &locals[0], &ownership).unwrap();
        let mut colors = GhostedColors::new(&layout);
        assert_eq!(colors.owned().len(), 2);
        assert_eq!(colors.ghosts().len(), 1);
        colors.set(2, 9);
        colors.owned_mut()[0] = 4;
        assert_eq!(colors.as_slice(), &[4, 0, 9]);
        assert_eq!(colors.into_owned(), vec![4, 0]);
    }

    #[test]
    fn push_overwrites_remote_ghosts() {
        let (ownership, locals) = generators::partition_blocks(&generators::path(4), 2);
        let out = LocalCluster::new(2)
            .try_run(|comm| {
                let layout = VertexLayout::build(comm.rank(), &locals[comm.rank()], &ownership)?;
                let mut colors = GhostedColors::new(&layout);
                for (i, c) in colors.owned_mut().iter_mut().enumerate() {
                    *c = (comm.rank() * 10 + i + 1) as Color;
                }
                let volume = colors.push_owned_to_ghosts(&comm, &layout, None)?;
                Ok((colors.as_slice().to_vec(), volume))
            })
            .unwrap();
        // Rank 0 owns {0, 1} and ghosts 2; rank 1 owns {2, 3} and ghosts 1.
        assert_eq!(out[0].0, vec![1, 2, 11]);
        assert_eq!(out[1].0, vec![11, 12, 2]);
        assert_eq!(out[0].1.updates_sent, 1);
        assert_eq!(out[0].1.updates_received, 1);
        assert_eq!(out[0].1.bytes_sent, ColorUpdate::SIZE);
        assert_eq!(out[0].1.peers_contacted, 1);
    }

    #[test]
    fn dirty_list_limits_traffic() {
        let (ownership, locals) = generators::partition_blocks(&generators::path(4), 2);
        let out = LocalCluster::new(2)
            .try_run(|comm| {
                let layout = VertexLayout::build(comm.rank(), &locals[comm.rank()], &ownership)?;
                let mut colors = GhostedColors::new(&layout);
                // Only interior vertex 0 on rank 0 is dirty: nothing to send.
                let dirty: &[usize] = if comm.rank() == 0 { &[0] } else { &[] };
                colors.push_owned_to_ghosts(&comm, &layout, Some(dirty))
            })
            .unwrap();
        assert!(out.iter().all(|v| v.updates_sent == 0 && v.updates_received == 0));
    }

    #[test]
    fn mismatched_layout_is_rejected() {
        let ownership = BlockOwnership::even(4, 2);
        let mut local = LocalGraph::new();
        local.push_vertex(0, vec![1]);
        local.push_vertex(1, vec![0]);
        let layout = VertexLayout::build(0, &local, &ownership).unwrap();
        let mut colors = GhostedColors::new(&layout);
        assert!(matches!(
            colors.push_owned_to_ghosts(&SingleRankComm, &layout, None),
            Err(ColoringError::CommunicatorMismatch { .. })
        ));
    }
}
