//! Word-packed atomic bitset.
//!
//! A dense alternative to `Vec<AtomicBool>` for per-vertex flags that are set
//! from parallel scans (e.g. "lost a conflict, retry").

use core::sync::atomic::{AtomicUsize, Ordering};

/// A fixed-size, word-packed atomic bitset.
pub struct AtomicBitset {
    bits: usize,
    words: Vec<AtomicUsize>,
}

impl AtomicBitset {
    /// Creates a new bitset with `bits` bits, all cleared.
    pub fn new(bits: usize) -> Self {
        let words_len = bits.div_ceil(usize::BITS as usize);
        let words = (0..words_len).map(|_| AtomicUsize::new(0)).collect();
        Self { bits, words }
    }

    /// Number of bits.
    pub fn len_bits(&self) -> usize {
        self.bits
    }

    /// Clears all bits.
    pub fn clear_all(&self) {
        for w in &self.words {
            w.store(0, Ordering::Relaxed);
        }
    }

    /// Returns whether `bit` is set.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    pub fn is_set(&self, bit: usize) -> bool {
        assert!(bit < self.bits, "bit {bit} out of range");
        let (word, mask) = bit_word_mask(bit);
        (self.words[word].load(Ordering::Relaxed) & mask) != 0
    }

    /// Sets `bit` and returns `true` iff this call observed it previously cleared.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    pub fn test_and_set(&self, bit: usize, order: Ordering) -> bool {
        assert!(bit < self.bits, "bit {bit} out of range");
        let (word, mask) = bit_word_mask(bit);
        let prev = self.words[word].fetch_or(mask, order);
        (prev & mask) == 0
    }

    /// Clears `bit`.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    pub fn clear(&self, bit: usize, order: Ordering) {
        assert!(bit < self.bits, "bit {bit} out of range");
        let (word, mask) = bit_word_mask(bit);
        self.words[word].fetch_and(!mask, order);
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    /// Set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        let word_bits = usize::BITS as usize;
        self.words.iter().enumerate().flat_map(move |(wi, w)| {
            let mut word = w.load(Ordering::Relaxed);
            core::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let tz = word.trailing_zeros() as usize;
                word &= word - 1;
                Some(wi * word_bits + tz)
            })
        })
    }
}

#[inline(always)]
fn bit_word_mask(bit: usize) -> (usize, usize) {
    let word_bits = usize::BITS as usize;
    (bit / word_bits, 1usize << (bit % word_bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_set_reports_first_setter() {
        let set = AtomicBitset::new(130);
        assert!(set.test_and_set(129, Ordering::Relaxed));
        assert!(!set.test_and_set(129, Ordering::Relaxed));
        assert!(set.is_set(129));
        assert!(!set.is_set(128));
        set.clear(129, Ordering::Relaxed);
        assert!(!set.is_set(129));
    }

    #[test]
    fn iter_ones_is_ascending_across_words() {
        let set = AtomicBitset::new(200);
        for b in [150, 3, 64, 63, 199] {
            set.test_and_set(b, Ordering::Relaxed);
        }
        assert_eq!(set.iter_ones().collect::<Vec<_>>(), vec![3, 63, 64, 150, 199]);
        assert_eq!(set.count_ones(), 5);
        set.clear_all();
        assert_eq!(set.count_ones(), 0);
    }

    #[test]
    fn concurrent_setters_claim_each_bit_once() {
        let set = AtomicBitset::new(1024);
        let claimed = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for b in 0..1024 {
                        if set.test_and_set(b, Ordering::Relaxed) {
                            claimed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });
        assert_eq!(claimed.load(Ordering::Relaxed), 1024);
    }
}
