//! In-process ranks: one OS thread per rank, one mailbox per destination.
//!
//! Each collective call draws a sequence number. Since every rank enters
//! collectives in the same order, the `(seq, from)` pair identifies a message
//! uniquely; envelopes that arrive for a later collective simply wait in the
//! mailbox until their receiver gets there.
//!
//! A rank whose communicator is dropped (normal exit or unwinding) is marked
//! dead and every mailbox is woken, so peers blocked on it fail with
//! [`ColoringError::PeerDisconnected`] instead of hanging.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crossbeam_utils::CachePadded;

use super::{check_send_count, Communicator};
use crate::error::{ColoringError, Result};

struct Envelope {
    seq: u64,
    from: usize,
    payload: Vec<u8>,
}

#[derive(Default)]
struct Mailbox {
    queue: Mutex<Vec<Envelope>>,
    ready: Condvar,
}

impl Mailbox {
    fn lock(&self) -> MutexGuard<'_, Vec<Envelope>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ClusterShared {
    mailboxes: Vec<CachePadded<Mailbox>>,
    alive: Vec<CachePadded<AtomicBool>>,
}

/// Communicator endpoint for one in-process rank.
///
/// Not `Sync`: a rank's collectives are issued from the thread that owns it.
pub struct ThreadComm {
    rank: usize,
    shared: Arc<ClusterShared>,
    seq: Cell<u64>,
}

impl ThreadComm {
    fn next_seq(&self) -> u64 {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        seq
    }

    fn post(&self, dest: usize, seq: u64, payload: Vec<u8>) {
        let mailbox = &self.shared.mailboxes[dest];
        mailbox.lock().push(Envelope {
            seq,
            from: self.rank,
            payload,
        });
        mailbox.ready.notify_all();
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.mailboxes.len()
    }

    fn all_to_all_v(&self, sends: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        let size = self.size();
        check_send_count(&sends, size)?;
        let seq = self.next_seq();

        let mut received: Vec<Option<Vec<u8>>> = vec![None; size];
        for (dest, payload) in sends.into_iter().enumerate() {
            if dest == self.rank {
                received[dest] = Some(payload);
            } else {
                self.post(dest, seq, payload);
            }
        }

        let mut missing = size - 1;
        let mailbox = &self.shared.mailboxes[self.rank];
        let mut queue = mailbox.lock();
        loop {
            let mut i = 0;
            while i < queue.len() {
                if queue[i].seq == seq {
                    let env = queue.swap_remove(i);
                    received[env.from] = Some(env.payload);
                    missing -= 1;
                } else {
                    i += 1;
                }
            }
            if missing == 0 {
                break;
            }
            // Liveness is checked under our mailbox lock; a dying peer takes
            // the same lock before notifying, so the wakeup cannot be missed.
            if let Some(peer) = (0..size).find(|&p| {
                received[p].is_none() && !self.shared.alive[p].load(Ordering::Acquire)
            }) {
                return Err(ColoringError::PeerDisconnected {
                    rank: self.rank,
                    peer,
                });
            }
            queue = mailbox.ready.wait(queue).unwrap_or_else(PoisonError::into_inner);
        }
        drop(queue);

        tracing::trace!(rank = self.rank, seq, "all_to_all_v complete");
        Ok(received.into_iter().map(Option::unwrap_or_default).collect())
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        self.shared.alive[self.rank].store(false, Ordering::Release);
        for mailbox in &self.shared.mailboxes {
            let _guard = mailbox.lock();
            mailbox.ready.notify_all();
        }
    }
}

/// A fixed-size group of in-process ranks.
#[derive(Debug, Clone, Copy)]
pub struct LocalCluster {
    size: usize,
}

impl LocalCluster {
    /// Creates a cluster of `size` ranks.
    ///
    /// # Panics
    /// Panics if `size == 0`.
    pub fn new(size: usize) -> Self {
        assert!(size != 0, "cluster size must be > 0");
        Self { size }
    }

    /// Number of ranks.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Creates one connected endpoint per rank, in rank order.
    ///
    /// Each endpoint must be moved to its own thread before the first collective.
    pub fn communicators(&self) -> Vec<ThreadComm> {
        let shared = Arc::new(ClusterShared {
            mailboxes: (0..self.size).map(|_| CachePadded::new(Mailbox::default())).collect(),
            alive: (0..self.size).map(|_| CachePadded::new(AtomicBool::new(true))).collect(),
        });
        (0..self.size)
            .map(|rank| ThreadComm {
                rank,
                shared: Arc::clone(&shared),
                seq: Cell::new(0),
            })
            .collect()
    }

    /// Runs `f` once per rank on scoped threads and returns the results in rank order.
    ///
    /// # Errors
    /// Returns [`ColoringError::RankPanicked`] for the lowest panicking rank.
    pub fn run<R, F>(&self, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(ThreadComm) -> R + Sync,
    {
        let comms = self.communicators();
        std::thread::scope(|scope| {
            let f = &f;
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| scope.spawn(move || f(comm)))
                .collect();
            // Join every handle before reporting, so the lowest panicking rank wins.
            let joined: Vec<_> = handles
                .into_iter()
                .enumerate()
                .map(|(rank, h)| h.join().map_err(|_| ColoringError::RankPanicked(rank)))
                .collect();
            joined.into_iter().collect()
        })
    }

    /// Like [`LocalCluster::run`] for fallible rank bodies.
    ///
    /// When several ranks fail, the reported error is the lowest-rank failure that
    /// is not a [`ColoringError::PeerDisconnected`] knock-on, if there is one.
    ///
    /// # Errors
    /// Propagates the selected rank error, or a panic as in [`LocalCluster::run`].
    pub fn try_run<R, F>(&self, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(ThreadComm) -> Result<R> + Sync,
    {
        let results = self.run(f)?;
        let mut first_error = None;
        let mut values = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(v) => values.push(v),
                Err(e) => {
                    let replace = match &first_error {
                        None => true,
                        Some(prev) => is_knock_on(prev) && !is_knock_on(&e),
                    };
                    if replace {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(values),
        }
    }
}

fn is_knock_on(e: &ColoringError) -> bool {
    matches!(e, ColoringError::PeerDisconnected { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_to_all_routes_by_destination() {
        let out = LocalCluster::new(3)
            .try_run(|comm| {
                let me = comm.rank() as u8;
                let sends = (0..3u8).map(|dest| vec![me, dest]).collect();
                comm.all_to_all_v(sends)
            })
            .unwrap();
        for (rank, recv) in out.iter().enumerate() {
            for (from, buf) in recv.iter().enumerate() {
                assert_eq!(buf, &vec![from as u8, rank as u8]);
            }
        }
    }

    #[test]
    fn reductions_agree_on_every_rank() {
        let out = LocalCluster::new(4)
            .try_run(|comm| {
                let r = comm.rank() as u64;
                Ok((
                    comm.all_reduce_sum(r + 1)?,
                    comm.all_reduce_max(r * 10)?,
                    comm.all_reduce_or(r == 2)?,
                ))
            })
            .unwrap();
        assert!(out.iter().all(|&x| x == (10, 30, true)));
    }

    #[test]
    fn back_to_back_collectives_do_not_mix() {
        let out = LocalCluster::new(2)
            .try_run(|comm| {
                let mut seen = Vec::new();
                for round in 0..20u8 {
                    let recv = comm.all_to_all_v(vec![vec![round]; 2])?;
                    seen.push(recv[1 - comm.rank()][0]);
                }
                Ok(seen)
            })
            .unwrap();
        let expected: Vec<u8> = (0..20).collect();
        assert_eq!(out[0], expected);
        assert_eq!(out[1], expected);
    }

    #[test]
    fn early_exit_is_reported_not_hung() {
        let err = LocalCluster::new(2)
            .try_run(|comm| {
                if comm.rank() == 1 {
                    return Ok(());
                }
                comm.barrier()
            })
            .unwrap_err();
        assert_eq!(err, ColoringError::PeerDisconnected { rank: 0, peer: 1 });
    }

    #[test]
    fn panics_become_errors() {
        let err = LocalCluster::new(2)
            .try_run(|comm| {
                if comm.rank() == 1 {
                    panic!("rank 1 fails");
                }
                comm.barrier()
            })
            .unwrap_err();
        assert_eq!(err, ColoringError::RankPanicked(1));
    }

    #[test]
    fn root_cause_wins_over_knock_on() {
        let err = LocalCluster::new(3)
            .try_run(|comm| {
                if comm.rank() == 2 {
                    return Err(ColoringError::UnknownVertex(7));
                }
                comm.barrier()
            })
            .unwrap_err();
        assert_eq!(err, ColoringError::UnknownVertex(7));
    }
}
