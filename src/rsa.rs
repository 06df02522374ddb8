//! RSA BitVector — Rank/Select/Access over a frozen [`BitVector`]
//!
//! Jacobson-style two-level rank directory: the bitvector is partitioned
//! into chunks of [`WORDS_PER_CHUNK`] words, each holding a cumulative
//! 1-count at its left boundary plus, per word within the chunk, a
//! cumulative count relative to the chunk's own boundary. `rank` combines
//! the chunk counter, the sub-chunk counter, and a single masked popcount.
//!
//! Select is a dense rank-to-position table built by one linear scan at
//! construction, one table per bit value, each terminated by a sentinel
//! entry mapping "one past the last occurrence" to `len` — this is the
//! query the BWT's LF-search endpoints rely on.

use thiserror::Error;

use crate::bitvector::BitVector;

/// Sub-chunks per chunk (`K` in the Jacobson directory).
const WORDS_PER_CHUNK: usize = 4;
const WORD_BITS: usize = 64;
const CHUNK_BITS: usize = WORDS_PER_CHUNK * WORD_BITS;

/// Failure from an out-of-range rank/access query.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RsaError {
    #[error("rank/access index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
}

/// An immutable bitvector supporting O(1) rank, dense-table select, and
/// access, built over a [`BitVector`] that must not be mutated afterward.
pub struct RsaBitVector {
    bv: BitVector,
    chunk_cum: Vec<u64>,
    subchunk_cum: Vec<[u16; WORDS_PER_CHUNK]>,
    ones: usize,
    pos0: Vec<usize>,
    pos1: Vec<usize>,
}

impl RsaBitVector {
    /// Freeze `bv` and build its rank/select directories in one pass.
    pub fn build(bv: BitVector) -> Self {
        let n = bv.len();
        let num_words = (n + WORD_BITS - 1) / WORD_BITS;
        let num_chunks = (num_words + WORDS_PER_CHUNK - 1) / WORDS_PER_CHUNK;

        let mut chunk_cum = Vec::with_capacity(num_chunks);
        let mut subchunk_cum = Vec::with_capacity(num_chunks);
        let mut sum: u64 = 0;

        for c in 0..num_chunks {
            chunk_cum.push(sum);
            let mut sub = [0u16; WORDS_PER_CHUNK];
            let mut local: u32 = 0;
            for (s, slot) in sub.iter_mut().enumerate() {
                *slot = local as u16;
                local += bv.get_word(c * WORDS_PER_CHUNK + s).count_ones();
            }
            subchunk_cum.push(sub);
            sum += local as u64;
        }
        let ones = sum as usize;

        let mut pos0 = Vec::with_capacity(n - ones + 1);
        let mut pos1 = Vec::with_capacity(ones + 1);
        for i in 0..n {
            if bv.get(i).expect("i < n by loop bound") {
                pos1.push(i);
            } else {
                pos0.push(i);
            }
        }
        // sentinel: select(b, total_b) resolves to n, per the LF endpoint contract.
        pos0.push(n);
        pos1.push(n);

        Self { bv, chunk_cum, subchunk_cum, ones, pos0, pos1 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bv.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bv.is_empty()
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    #[inline]
    pub fn count_zeros(&self) -> usize {
        self.bv.len() - self.ones
    }

    /// Number of `b`-bits in `[0, i)`. Fails if `i` is outside `[0, len]`.
    pub fn rank(&self, bit: bool, i: usize) -> Result<usize, RsaError> {
        let n = self.bv.len();
        if i > n {
            return Err(RsaError::OutOfRange { index: i, len: n });
        }
        Ok(self.rank_unchecked(bit, i))
    }

    /// Bit at `i`. Fails if `i` is outside `[0, len)`.
    pub fn access(&self, i: usize) -> Result<bool, RsaError> {
        self.bv.get(i).map_err(|_| RsaError::OutOfRange { index: i, len: self.bv.len() })
    }

    /// Position of the `r`-th `b`-bit (0-indexed), or `None` if `r` is out
    /// of range. `r == count_b` resolves to `len` via the sentinel entry.
    pub fn select(&self, bit: bool, r: usize) -> Option<usize> {
        let table = if bit { &self.pos1 } else { &self.pos0 };
        table.get(r).copied()
    }

    /// Rank without bounds checking, for callers (the wavelet tree, the
    /// BWT's LF-search) that already guarantee `i <= len` by construction.
    pub(crate) fn rank_unchecked(&self, bit: bool, i: usize) -> usize {
        let ones = self.rank1(i);
        if bit {
            ones
        } else {
            i - ones
        }
    }

    /// Access without bounds checking, same invariant as [`Self::rank_unchecked`].
    pub(crate) fn access_unchecked(&self, i: usize) -> bool {
        self.bv.get(i).expect("index within rsa bitvector length")
    }

    fn rank1(&self, i: usize) -> usize {
        if i == 0 {
            return 0;
        }
        if i == self.bv.len() {
            return self.ones;
        }
        let chunk = i / CHUNK_BITS;
        let within_chunk = i % CHUNK_BITS;
        let sub = within_chunk / WORD_BITS;
        let bit_in_word = within_chunk % WORD_BITS;

        let mut r = self.chunk_cum[chunk] as usize + self.subchunk_cum[chunk][sub] as usize;
        if bit_in_word > 0 {
            let word = self.bv.get_word(chunk * WORDS_PER_CHUNK + sub);
            let mask = (1u64 << bit_in_word) - 1;
            r += (word & mask).count_ones() as usize;
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_from_bits(bits: &[bool]) -> RsaBitVector {
        let mut bv = BitVector::new(0);
        for &b in bits {
            bv.push(b);
        }
        RsaBitVector::build(bv)
    }

    #[test]
    fn rank_matches_naive_popcount() {
        let bits: Vec<bool> = (0..256).map(|i| i % 3 == 0 || i % 5 == 0).collect();
        let rsa = build_from_bits(&bits);

        for i in 0..=bits.len() {
            let ones = bits[..i].iter().filter(|&&b| b).count();
            assert_eq!(rsa.rank(true, i).unwrap(), ones, "rank1 at {i}");
            assert_eq!(rsa.rank(false, i).unwrap(), i - ones, "rank0 at {i}");
        }
        assert_eq!(rsa.rank(true, bits.len()).unwrap(), rsa.count_ones());
    }

    #[test]
    fn rank_out_of_range_fails() {
        let rsa = build_from_bits(&[true, false, true]);
        assert!(matches!(rsa.rank(true, 4), Err(RsaError::OutOfRange { index: 4, len: 3 })));
    }

    #[test]
    fn select_inverts_rank() {
        let bits = [true, false, true, true, false, true, false, false, true];
        let rsa = build_from_bits(&bits);

        for (p, &b) in bits.iter().enumerate() {
            let r = rsa.rank(b, p).unwrap();
            assert_eq!(rsa.select(b, r), Some(p));
        }
    }

    #[test]
    fn select_one_past_last_returns_len() {
        let bits = [true, false, true, false];
        let rsa = build_from_bits(&bits);
        assert_eq!(rsa.select(true, rsa.count_ones()), Some(4));
        assert_eq!(rsa.select(false, rsa.count_zeros()), Some(4));
        assert_eq!(rsa.select(true, rsa.count_ones() + 1), None);
    }

    #[test]
    fn access_matches_source_bits() {
        let bits = [true, false, false, true, true];
        let rsa = build_from_bits(&bits);
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(rsa.access(i).unwrap(), b);
        }
        assert!(rsa.access(bits.len()).is_err());
    }

    #[test]
    fn rank_across_chunk_boundaries() {
        // WORDS_PER_CHUNK * WORD_BITS = 256 bits per chunk; span several chunks.
        let bits: Vec<bool> = (0..1024).map(|i| i % 2 == 0).collect();
        let rsa = build_from_bits(&bits);
        assert_eq!(rsa.rank(true, 256).unwrap(), 128);
        assert_eq!(rsa.rank(true, 512).unwrap(), 256);
        assert_eq!(rsa.rank(true, 1024).unwrap(), 512);
    }
}
