//! Data-parallel loops that fall back to plain iterators without the
//! `parallel` feature.
//!
//! Callers must not depend on execution order; results of `map_each` are
//! returned in input order either way.

#[cfg(feature = "parallel")]
pub(crate) fn map_each<T, F>(items: &[usize], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().map(|&v| f(v)).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_each<T, F>(items: &[usize], f: F) -> Vec<T>
where
    F: Fn(usize) -> T,
{
    items.iter().map(|&v| f(v)).collect()
}

/// Applies `f` to consecutive `block`-sized chunks and concatenates the
/// results in input order. Chunk boundaries do not depend on the thread count.
#[cfg(feature = "parallel")]
pub(crate) fn map_blocks<T, F>(items: &[usize], block: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&[usize]) -> Vec<T> + Sync + Send,
{
    use rayon::prelude::*;
    let parts: Vec<Vec<T>> = items.par_chunks(block).map(f).collect();
    parts.into_iter().flatten().collect()
}

/// Applies `f` to consecutive `block`-sized chunks and concatenates the
/// results in input order.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_blocks<T, F>(items: &[usize], block: usize, f: F) -> Vec<T>
where
    F: Fn(&[usize]) -> Vec<T>,
{
    items.chunks(block).flat_map(f).collect()
}

#[cfg(feature = "parallel")]
pub(crate) fn for_each<T, F>(items: &[T], f: F)
where
    T: Sync,
    F: Fn(&T) + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().for_each(f);
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each<T, F>(items: &[T], f: F)
where
    F: Fn(&T),
{
    items.iter().for_each(f);
}

/// Sum of `f` over `0..n`.
#[cfg(feature = "parallel")]
pub(crate) fn sum_range<F>(n: usize, f: F) -> usize
where
    F: Fn(usize) -> usize + Sync + Send,
{
    use rayon::prelude::*;
    (0..n).into_par_iter().map(f).sum()
}

/// Sum of `f` over `0..n`.
#[cfg(not(feature = "parallel"))]
pub(crate) fn sum_range<F>(n: usize, f: F) -> usize
where
    F: Fn(usize) -> usize,
{
    (0..n).map(f).sum()
}
