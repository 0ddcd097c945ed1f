//! Size-1 communicator.

use super::{check_send_count, Communicator};
use crate::error::Result;

/// Communicator for a run with a single rank. Every collective is a local copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleRankComm;

impl Communicator for SingleRankComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_to_all_v(&self, sends: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        check_send_count(&sends, 1)?;
        Ok(sends)
    }

    fn barrier(&self) -> Result<()> {
        Ok(())
    }

    fn all_reduce_sum(&self, value: u64) -> Result<u64> {
        Ok(value)
    }

    fn all_reduce_max(&self, value: u64) -> Result<u64> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rank_collectives_are_identity() {
        let comm = SingleRankComm;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert_eq!(comm.all_reduce_sum(42).unwrap(), 42);
        assert_eq!(comm.all_reduce_max(7).unwrap(), 7);
        assert!(comm.all_reduce_or(true).unwrap());
        assert!(!comm.all_reduce_or(false).unwrap());
        assert_eq!(comm.all_to_all_v(vec![vec![1, 2]]).unwrap(), vec![vec![1, 2]]);
        comm.barrier().unwrap();
    }

    #[test]
    fn single_rank_rejects_wrong_send_count() {
        assert!(SingleRankComm.all_to_all_v(vec![vec![], vec![]]).is_err());
    }
}
