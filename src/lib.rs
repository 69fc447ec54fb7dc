//! Snappy block compression exposed as a byte transform.
//!
//! A block is the varint-encoded decoded length followed by a stream of
//! literal and copy items. [`SnappyCodec`] compresses one block from a
//! source [`Region`] into a destination [`Region`] and back, advancing the
//! caller's cursors on success:
//!
//! ```
//! use snappy_codec::{ByteFunction, Region, SnappyCodec, max_compressed_len};
//!
//! let input = b"aaaaaaaaaaaaaaaaaaaa";
//! let mut packed = vec![0; max_compressed_len(input.len())];
//! let mut codec = SnappyCodec::new();
//!
//! let mut src = Region::new(&input[..]);
//! let mut dst = Region::new(&mut packed[..]);
//! assert!(codec.forward(&mut src, &mut dst));
//! let n = dst.index;
//!
//! let mut unpacked = vec![0; input.len()];
//! let mut src = Region::new(&packed[..n]);
//! let mut dst = Region::new(&mut unpacked[..]);
//! assert!(codec.inverse(&mut src, &mut dst));
//! assert_eq!(&unpacked[..], &input[..]);
//! ```

// Definitions
mod definitions {

    //
    // Each encoded block begins with the varint-encoded length of the decoded
    // data, followed by a sequence of chunks. Chunks begin and end on byte
    // boundaries. The first byte of each chunk is broken into its 2 least and
    // 6 most significant bits called l and m: l ranges in [0, 4) and m ranges
    // in [0, 64). l is the chunk tag. Zero means a literal tag. All other
    // values mean a copy tag.
    //
    // For literal tags:
    // - If m < 60, the next 1 + m bytes are literal bytes.
    // - Otherwise, let n be the little-endian unsigned integer denoted by the
    // next m - 59 bytes. The next 1 + n bytes after that are literal bytes.
    //
    // For copy tags, length bytes are copied from offset bytes ago:
    // - For l == 1, the offset ranges in [0, 1<<11) and the length in [4, 12).
    // The length is 4 + the low 3 bits of m. The high 3 bits of m form bits
    // 8-10 of the offset. The next byte is bits 0-7 of the offset.
    // - For l == 2, the offset ranges in [0, 1<<16) and the length in [1, 65).
    // The length is 1 + m. The offset is the little-endian unsigned integer
    // denoted by the next 2 bytes.
    // - l == 3 is not produced and is rejected when decoding.
    //
    pub const TAG_LITERAL: u8 = 0x00;
    pub const TAG_COPY_1: u8 = 0x01;
    pub const TAG_COPY_2: u8 = 0x02;
    pub const TAG_COPY_4: u8 = 0x03;

    // Literal length markers held in the upper 6 bits of a literal tag.
    pub const LITERAL_LEN_1: u8 = 60;
    pub const LITERAL_LEN_2: u8 = 61;
    pub const LITERAL_LEN_3: u8 = 62;
    pub const LITERAL_LEN_4: u8 = 63;

    // Hash table size ranges from 1<<8 to 1<<14 inclusive.
    pub const MIN_TABLE_SIZE: usize = 1 << 8;
    pub const MAX_TABLE_SIZE: usize = 1 << 14;

    // We limit how far copy back-references can go, the same as the C++ code.
    pub const MAX_OFFSET: usize = 1 << 15;

    pub const HASH_SEED: u32 = 0x1e35_a7bd;

    // Largest decoded length a block header may announce.
    pub const MAX_BLOCK_LEN: usize = i32::MAX as usize;
}

pub use definitions::{
    HASH_SEED, MAX_BLOCK_LEN, MAX_OFFSET, MAX_TABLE_SIZE, MIN_TABLE_SIZE, TAG_COPY_1, TAG_COPY_2,
    TAG_COPY_4, TAG_LITERAL,
};

mod error;
pub use self::error::{Error, Result};

pub mod varint;

mod region;
pub use self::region::Region;

// Snappy Compressor
mod compress;
pub use self::compress::{compress, compress_vec, max_compressed_len, MatchTable};

// Snappy Decompressor
mod decompress;
pub use self::decompress::{decompress, decompress_vec, decompressed_len, Item};

mod codec;
pub use self::codec::{ByteFunction, SnappyCodec};
