//! Lock-free helpers shared by the parallel kernels.

pub mod bitset;
pub(crate) mod parallel;

pub use bitset::AtomicBitset;
