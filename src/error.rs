//! Public error types for building and querying a [`crate::bwt::Bwt`] index.

use thiserror::Error;

/// Failure to build a [`crate::bwt::Bwt`] index.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("cannot build an index over an empty sequence")]
    EmptyInput,
    #[error("input sequence contains the reserved sentinel byte 0x{:02x}", crate::bwt::SENTINEL)]
    SentinelInInput,
}

/// Failure from a query against a built [`crate::bwt::Bwt`] index.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    #[error("count/locate called with an empty pattern")]
    EmptyPattern,
    #[error("extract range [{start}, {end}) is invalid: start must be < end")]
    InvalidRange { start: usize, end: usize },
    #[error("extract end {end} is out of range for sequence length {len}")]
    OutOfRange { end: usize, len: usize },
}
