//! Message-passing layer between ranks.
//!
//! The engine talks to its peers only through [`Communicator`]: one bulk
//! byte exchange per round plus scalar reductions. Implementations:
//! - [`SingleRankComm`]: size-1 communicator, every collective is local
//! - [`ThreadComm`]: one rank per OS thread, mailboxes keyed by destination
//!
//! Collectives are blocking and must be entered by every rank in the same
//! order. `all_to_all_v` returns only after every peer's contribution to the
//! same collective has arrived, so data sent in round N is visible everywhere
//! before any rank starts round N+1.

pub mod cluster;
pub mod single;
pub mod wire;

pub use cluster::{LocalCluster, ThreadComm};
pub use single::SingleRankComm;
pub use wire::ColorUpdate;

use crate::error::{ColoringError, Result};

/// Blocking collective communication between a fixed set of ranks.
pub trait Communicator {
    /// This rank, in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of ranks.
    fn size(&self) -> usize;

    /// Personalized all-to-all: `sends[r]` goes to rank `r`, the result holds
    /// what each rank sent here (including `sends[self.rank()]` itself).
    ///
    /// # Errors
    /// Fails if `sends.len() != size()` or a peer disconnects.
    fn all_to_all_v(&self, sends: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>>;

    /// Blocks until every rank has entered the barrier.
    ///
    /// # Errors
    /// Fails if a peer disconnects.
    fn barrier(&self) -> Result<()> {
        self.all_to_all_v(vec![Vec::new(); self.size()]).map(drop)
    }

    /// Every rank's `value`, in rank order.
    ///
    /// # Errors
    /// Fails if a peer disconnects or sends a malformed scalar.
    fn all_gather_u64(&self, value: u64) -> Result<Vec<u64>> {
        let bytes = value.to_le_bytes().to_vec();
        self.all_to_all_v(vec![bytes; self.size()])?
            .into_iter()
            .map(|buf| {
                let raw: [u8; 8] = buf.as_slice().try_into().map_err(|_| {
                    ColoringError::MalformedMessage(format!(
                        "expected 8-byte scalar, got {} bytes",
                        buf.len()
                    ))
                })?;
                Ok(u64::from_le_bytes(raw))
            })
            .collect()
    }

    /// Sum over all ranks.
    ///
    /// # Errors
    /// See [`Communicator::all_gather_u64`].
    fn all_reduce_sum(&self, value: u64) -> Result<u64> {
        Ok(self.all_gather_u64(value)?.into_iter().fold(0u64, u64::wrapping_add))
    }

    /// Maximum over all ranks.
    ///
    /// # Errors
    /// See [`Communicator::all_gather_u64`].
    fn all_reduce_max(&self, value: u64) -> Result<u64> {
        Ok(self.all_gather_u64(value)?.into_iter().max().unwrap_or(value))
    }

    /// Logical or over all ranks.
    ///
    /// # Errors
    /// See [`Communicator::all_gather_u64`].
    fn all_reduce_or(&self, value: bool) -> Result<bool> {
        Ok(self.all_reduce_sum(u64::from(value))? != 0)
    }
}

pub(crate) fn check_send_count(sends: &[Vec<u8>], size: usize) -> Result<()> {
    if sends.len() == size {
        Ok(())
    } else {
        Err(ColoringError::MalformedMessage(format!(
            "all_to_all_v needs {size} send buffers, got {}",
            sends.len()
        )))
    }
}
