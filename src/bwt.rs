//! Burrows-Wheeler Transform full-text index (FM-Index core)
//!
//! Composes a lexicographic first-column skip list, a full suffix array, a
//! run-length compressed last column addressed through a [`WaveletTree`],
//! and per-character cumulative run counts, driven by LF-mapping backward
//! search. Built once by [`Bwt::build`]; every query afterward is read-only.

use log::debug;

use crate::error::{BuildError, QueryError};
use crate::wavelet::WaveletTree;

/// Reserved sentinel byte, lexicographically smaller than any byte legally
/// appearing in an indexed sequence.
pub const SENTINEL: u8 = 0x00;

/// One run of the sorted first column `F`: `byte` occupies rows `[start, end)`.
struct SkipEntry {
    byte: u8,
    start: usize,
    end: usize,
}

/// An immutable Burrows-Wheeler Transform index over a byte sequence.
///
/// Built once by [`Bwt::build`]; every query is read-only and safe to call
/// concurrently from multiple threads — there is no interior mutability.
pub struct Bwt {
    n: usize,
    suffix_array: Vec<usize>,
    inverse_suffix_array: Vec<usize>,
    skip_list: Vec<SkipEntry>,
    run_starts: Vec<usize>,
    run_wavelet: WaveletTree,
    run_cum_counts: Box<[Vec<usize>; 256]>,
}

impl Bwt {
    /// Build an index over `sequence`.
    ///
    /// Fails with [`BuildError::EmptyInput`] if `sequence` is empty, or
    /// [`BuildError::SentinelInInput`] if it contains the reserved
    /// [`SENTINEL`] byte.
    pub fn build(sequence: &[u8]) -> Result<Self, BuildError> {
        if sequence.is_empty() {
            return Err(BuildError::EmptyInput);
        }
        if sequence.contains(&SENTINEL) {
            return Err(BuildError::SentinelInInput);
        }

        let n = sequence.len();
        debug!("building BWT index over {n} bytes");

        let suffix_array = build_suffix_array(sequence);

        let mut inverse_suffix_array = vec![0usize; n + 1];
        for (k, &p) in suffix_array.iter().enumerate() {
            inverse_suffix_array[p] = k;
        }

        let last_column = build_last_column(sequence, &suffix_array);
        let skip_list = build_skip_list(sequence, &suffix_array);
        let (run_starts, run_chars) = run_length_encode(&last_column);
        let run_cum_counts = build_run_cum_counts(&run_chars, &run_starts, n + 1);

        let run_wavelet = WaveletTree::build(&run_chars)
            .expect("run_chars is non-empty whenever sequence is non-empty");

        debug!("compressed {} BWT bytes into {} runs", n + 1, run_starts.len());

        Ok(Self {
            n,
            suffix_array,
            inverse_suffix_array,
            skip_list,
            run_starts,
            run_wavelet,
            run_cum_counts,
        })
    }

    /// Length of the original sequence, excluding the sentinel.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Reconstruct the raw last column `L` of the sorted-rotations matrix,
    /// expanding the run-length compressed form back to `n + 1` bytes.
    pub fn transform(&self) -> Vec<u8> {
        let total = self.n + 1;
        let mut out = Vec::with_capacity(total);
        for (r, &start) in self.run_starts.iter().enumerate() {
            let end = self.run_starts.get(r + 1).copied().unwrap_or(total);
            let byte = self.run_wavelet.access(r).expect("run index within run_wavelet length");
            out.resize(out.len() + (end - start), byte);
        }
        out
    }

    /// Number of occurrences of `pattern` in the indexed sequence.
    pub fn count(&self, pattern: &[u8]) -> Result<usize, QueryError> {
        if pattern.is_empty() {
            return Err(QueryError::EmptyPattern);
        }
        let (lo, hi) = self.lf_search(pattern);
        Ok(hi.saturating_sub(lo))
    }

    /// All starting offsets of `pattern` in the indexed sequence, unsorted.
    pub fn locate(&self, pattern: &[u8]) -> Result<Vec<usize>, QueryError> {
        if pattern.is_empty() {
            return Err(QueryError::EmptyPattern);
        }
        let (lo, hi) = self.lf_search(pattern);
        Ok(self.suffix_array[lo..hi].to_vec())
    }

    /// Extract the substring `sequence[start..end)`.
    ///
    /// Fails with [`QueryError::InvalidRange`] if `start >= end`, or
    /// [`QueryError::OutOfRange`] if `end` exceeds [`Bwt::len`] (the
    /// sentinel itself is never extractable).
    pub fn extract(&self, start: usize, end: usize) -> Result<Vec<u8>, QueryError> {
        if start >= end {
            return Err(QueryError::InvalidRange { start, end });
        }
        if end > self.n {
            return Err(QueryError::OutOfRange { end, len: self.n });
        }

        let mut out = Vec::with_capacity(end - start);
        for p in start..end {
            let k = self.inverse_suffix_array[p];
            out.push(self.char_at_row(k));
        }
        Ok(out)
    }

    /// The byte occupying the sorted first column at row `k`, via the skip list.
    fn char_at_row(&self, k: usize) -> u8 {
        let idx = self
            .skip_list
            .binary_search_by(|entry| {
                if k < entry.start {
                    core::cmp::Ordering::Greater
                } else if k >= entry.end {
                    core::cmp::Ordering::Less
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .expect("every row index falls in exactly one skip-list entry");
        self.skip_list[idx].byte
    }

    /// `skip_list[c].start`, or `None` if `c` never appears in the sequence.
    fn f_start(&self, c: u8) -> Option<usize> {
        self.skip_list
            .binary_search_by_key(&c, |entry| entry.byte)
            .ok()
            .map(|idx| self.skip_list[idx].start)
    }

    /// Largest run index `r` with `run_starts[r] <= i`.
    fn run_index_at_or_before(&self, i: usize) -> usize {
        match self.run_starts.binary_search(&i) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        }
    }

    /// `LF(i, c) = F_start(c) + rank_L(c, i)`, computed from the
    /// run-compressed last column instead of a materialized `L`.
    fn lf_endpoint(&self, c: u8, f_start: usize, i: usize) -> usize {
        let r_star = self.run_index_at_or_before(i);
        let run_rank_c = self.run_wavelet.rank(c, r_star);
        let cum_before = self.run_cum_counts[c as usize][run_rank_c];
        let run_byte = self.run_wavelet.access(r_star).expect("run index within run_wavelet length");
        let extra = if run_byte == c { i - self.run_starts[r_star] } else { 0 };
        f_start + cum_before + extra
    }

    /// Backward search: narrow `[lo, hi)` over `pattern`, right to left.
    fn lf_search(&self, pattern: &[u8]) -> (usize, usize) {
        let mut lo = 0usize;
        let mut hi = self.n + 1;

        for &c in pattern.iter().rev() {
            if hi <= lo {
                return (lo, lo);
            }
            let Some(f_start) = self.f_start(c) else {
                return (0, 0);
            };
            let new_lo = self.lf_endpoint(c, f_start, lo);
            let new_hi = self.lf_endpoint(c, f_start, hi);
            lo = new_lo;
            hi = new_hi;
        }
        (lo, hi)
    }
}

/// Naive O(n log^2 n) suffix array of `text ∥ sentinel`, sentinel minimal.
/// Position `n` stands for the sentinel-terminated empty suffix; it sorts
/// first because an empty slice compares less than any non-empty one.
fn build_suffix_array(text: &[u8]) -> Vec<usize> {
    let n = text.len();
    let mut sa: Vec<usize> = (0..=n).collect();
    sa.sort_unstable_by(|&a, &b| {
        let s1: &[u8] = if a < n { &text[a..] } else { &[] };
        let s2: &[u8] = if b < n { &text[b..] } else { &[] };
        s1.cmp(s2)
    });
    sa
}

/// `L[k] = text'[SA[k] - 1 mod (n+1)]`, where `text' = text ∥ sentinel`.
fn build_last_column(text: &[u8], sa: &[usize]) -> Vec<u8> {
    sa.iter().map(|&idx| if idx == 0 { SENTINEL } else { text[idx - 1] }).collect()
}

/// Group the sorted first column `F` into contiguous runs per distinct byte.
fn build_skip_list(text: &[u8], sa: &[usize]) -> Vec<SkipEntry> {
    let n = text.len();
    let byte_at = |idx: usize| -> u8 { if idx == n { SENTINEL } else { text[idx] } };

    let mut skip_list = Vec::new();
    let mut k = 0;
    while k < sa.len() {
        let byte = byte_at(sa[k]);
        let start = k;
        k += 1;
        while k < sa.len() && byte_at(sa[k]) == byte {
            k += 1;
        }
        skip_list.push(SkipEntry { byte, start, end: k });
    }
    skip_list
}

/// Collapse maximal equal-byte runs of `last_column` into `(run_starts, run_chars)`.
fn run_length_encode(last_column: &[u8]) -> (Vec<usize>, Vec<u8>) {
    let mut run_starts = Vec::new();
    let mut run_chars = Vec::new();

    let mut i = 0;
    while i < last_column.len() {
        let byte = last_column[i];
        run_starts.push(i);
        run_chars.push(byte);
        let mut j = i + 1;
        while j < last_column.len() && last_column[j] == byte {
            j += 1;
        }
        i = j;
    }
    (run_starts, run_chars)
}

/// Per-byte cumulative count before each of that byte's runs, starting with
/// `0` and holding `(number_of_runs_of_c + 1)` entries.
fn build_run_cum_counts(run_chars: &[u8], run_starts: &[usize], total_len: usize) -> Box<[Vec<usize>; 256]> {
    let mut tables: Box<[Vec<usize>; 256]> = Box::new(core::array::from_fn::<_, 256, _>(|_| Vec::new()));

    for (r, &byte) in run_chars.iter().enumerate() {
        let end = run_starts.get(r + 1).copied().unwrap_or(total_len);
        let run_len = end - run_starts[r];

        let table = &mut tables[byte as usize];
        if table.is_empty() {
            table.push(0);
        }
        let cum_before = *table.last().unwrap();
        table.push(cum_before + run_len);
    }
    tables
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn non_sentinel_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(1u8..=25, 1..200)
    }

    proptest! {
        #[test]
        fn extract_matches_naive_slicing(text in non_sentinel_bytes()) {
            let bwt = Bwt::build(&text).unwrap();
            let n = text.len();
            for start in 0..n {
                for end in (start + 1)..=n {
                    prop_assert_eq!(bwt.extract(start, end).unwrap(), text[start..end].to_vec());
                }
            }
        }

        #[test]
        fn extract_round_trip(text in non_sentinel_bytes()) {
            let bwt = Bwt::build(&text).unwrap();
            prop_assert_eq!(bwt.extract(0, bwt.len()).unwrap(), text);
        }

        #[test]
        fn locate_offsets_are_real_occurrences(text in non_sentinel_bytes(), pat_len in 1usize..5) {
            let bwt = Bwt::build(&text).unwrap();
            if pat_len <= text.len() {
                let pattern = text[0..pat_len].to_vec();
                for &offset in &bwt.locate(&pattern).unwrap() {
                    prop_assert_eq!(&text[offset..offset + pattern.len()], pattern.as_slice());
                }
            }
        }

        #[test]
        fn locate_then_extract_matches_pattern(text in non_sentinel_bytes(), pat_len in 1usize..5) {
            let bwt = Bwt::build(&text).unwrap();
            if pat_len <= text.len() {
                let pattern = text[0..pat_len].to_vec();
                for &offset in &bwt.locate(&pattern).unwrap() {
                    prop_assert_eq!(bwt.extract(offset, offset + pattern.len()).unwrap(), pattern.clone());
                }
            }
        }

        #[test]
        fn count_equals_locate_len_prop(text in non_sentinel_bytes(), pat_len in 1usize..5) {
            let bwt = Bwt::build(&text).unwrap();
            if pat_len <= text.len() {
                let pattern = text[0..pat_len].to_vec();
                prop_assert_eq!(bwt.count(&pattern).unwrap(), bwt.locate(&pattern).unwrap().len());
            }
        }
    }
}
