use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

/// Reasons a block could not be compressed or decompressed.
///
/// Any error means the whole block is unusable; nothing written to the
/// destination before the failure carries meaning.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The destination cannot hold the worst case output of this call.
    #[error("snappy: output buffer (size = {given}) is smaller than required (size = {min})")]
    BufferTooSmall {
        /// Bytes available past the destination cursor.
        given: usize,
        /// Bytes the call needs.
        min: usize,
    },
    /// The input ended in the middle of an item or a length header.
    #[error("snappy: truncated input")]
    Truncated,
    /// The input is malformed.
    #[error("snappy: corrupt input ({0})")]
    Corrupt(&'static str),
    /// A varint does not fit in 64 bits.
    #[error("snappy: varint overflows 64 bits")]
    Overflow,
    /// The block is longer than a header may announce.
    #[error("snappy: input buffer (size = {given}) is larger than allowed (size = {max})")]
    TooBig { given: usize, max: usize },
    /// Block sizes cannot be negative.
    #[error("snappy: invalid block size {0} (must be at least 0)")]
    InvalidSize(i64),
}
