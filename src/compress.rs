use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::definitions::*;
use crate::error::{Error, Result};
use crate::varint::put_uvarint;

/// Scratch hash table for the match finder.
///
/// Maps a hash of the 4 bytes at a source position to the most recent
/// position with that hash. The table is reinitialized at the start of every
/// block, so its contents mean nothing between calls; one table serves one
/// compression at a time.
#[derive(Debug, Clone)]
pub struct MatchTable {
    slots: Vec<i32>,
    shift: u32,
}

impl MatchTable {
    pub fn new() -> MatchTable {
        MatchTable {
            slots: vec![-1; MAX_TABLE_SIZE],
            shift: 32 - MIN_TABLE_SIZE.trailing_zeros(),
        }
    }

    /// Sizes the table for a block of `count` bytes and empties it. Returns
    /// the number of slots in use: the smallest power of two in
    /// `[MIN_TABLE_SIZE, MAX_TABLE_SIZE]` that is at least `count`.
    pub fn reset(&mut self, count: usize) -> usize {
        let mut shift = 32 - MIN_TABLE_SIZE.trailing_zeros();
        let mut table_size = MIN_TABLE_SIZE;
        let max = count.min(MAX_TABLE_SIZE);

        while table_size < max {
            shift -= 1;
            table_size <<= 1;
        }

        self.shift = shift;
        for slot in &mut self.slots[..table_size] {
            *slot = -1;
        }
        trace!("snappy: match table of {} slots for {} bytes", table_size, count);
        table_size
    }

    /// Slot index for a little-endian 4-byte word.
    #[inline]
    pub fn hash(&self, word: u32) -> usize {
        (word.wrapping_mul(HASH_SEED) >> self.shift) as usize
    }

    /// Records `pos` as the latest position for `word` and returns the
    /// position previously stored there, or -1.
    #[inline]
    fn swap(&mut self, word: u32, pos: usize) -> i32 {
        let h = self.hash(word);
        let t = self.slots[h];
        self.slots[h] = pos as i32;
        t
    }
}

impl Default for MatchTable {
    fn default() -> MatchTable {
        MatchTable::new()
    }
}

// Compress writes the encoded form of src into dst and returns the length
// written.
// Returns an error if dst is not large enough to hold the worst case
// encoding of src.
pub fn compress(dst: &mut [u8], src: &[u8]) -> Result<usize> {
    compress_block(dst, src, &mut MatchTable::new())
}

/// Compresses `src` into a freshly allocated block.
pub fn compress_vec(src: &[u8]) -> Result<Vec<u8>> {
    let mut dst = vec![0; max_compressed_len(src.len())];
    let n = compress(&mut dst, src)?;
    dst.truncate(n);
    Ok(dst)
}

// Encodes all of src as one block at the front of dst, using table as the
// match finder's scratch space.
pub(crate) fn compress_block(dst: &mut [u8], src: &[u8], table: &mut MatchTable) -> Result<usize> {
    if src.len() > MAX_BLOCK_LEN {
        return Err(Error::TooBig {
            given: src.len(),
            max: MAX_BLOCK_LEN,
        });
    }

    let min = max_compressed_len(src.len());
    if dst.len() < min {
        return Err(Error::BufferTooSmall {
            given: dst.len(),
            min,
        });
    }

    // Start Block with varint-encoded length of decompressed bytes
    let mut d = put_uvarint(dst, src.len() as u64)?;

    // Return early if src is short
    if src.len() <= 4 {
        if !src.is_empty() {
            d += emit_literal(&mut dst[d..], src);
        }
        return Ok(d);
    }

    table.reset(src.len());

    // s is the scan position, lit the start of any pending literal bytes.
    let mut s: usize = 0;
    let mut lit: usize = 0;

    while s + 3 < src.len() {
        let word = LittleEndian::read_u32(&src[s..]);
        let t = table.swap(word, s);

        // If t is invalid or src[s:s+4] differs from src[t:t+4], accumulate a
        // literal byte.
        if t < 0 {
            s += 1;
            continue;
        }
        let mut t = t as usize;
        if s - t >= MAX_OFFSET || LittleEndian::read_u32(&src[t..]) != word {
            s += 1;
            continue;
        }

        // Otherwise, we have a match. First, emit any pending literal bytes.
        if lit != s {
            d += emit_literal(&mut dst[d..], &src[lit..s]);
        }

        // Extend the match to be as long as possible
        let s0 = s;
        s += 4;
        t += 4;
        while s < src.len() && src[s] == src[t] {
            s += 1;
            t += 1;
        }

        d += emit_copy(&mut dst[d..], s - t, s - s0);
        lit = s;
    }

    // Emit any final pending literal bytes and return.
    if lit != src.len() {
        d += emit_literal(&mut dst[d..], &src[lit..]);
    }

    trace!("snappy: compressed {} bytes into {}", src.len(), d);
    Ok(d)
}

// emit_literal writes a literal chunk and returns the number of bytes written.
// The caller guarantees 1 <= lit.len() <= 1 << 32 and room for the chunk.
pub(crate) fn emit_literal(dst: &mut [u8], lit: &[u8]) -> usize {
    let n = lit.len() - 1;

    let i = if n < 60 {
        dst[0] = (n as u8) << 2 | TAG_LITERAL;
        1
    } else {
        let (marker, extra) = if n < 1 << 8 {
            (LITERAL_LEN_1, 1)
        } else if n < 1 << 16 {
            (LITERAL_LEN_2, 2)
        } else if n < 1 << 24 {
            (LITERAL_LEN_3, 3)
        } else {
            (LITERAL_LEN_4, 4)
        };
        dst[0] = marker << 2 | TAG_LITERAL;
        LittleEndian::write_uint(&mut dst[1..], n as u64, extra);
        1 + extra
    };

    dst[i..i + lit.len()].copy_from_slice(lit);
    i + lit.len()
}

// emit_copy writes a copy chunk and returns the number of bytes written.
// The caller guarantees 1 <= offset < 1 << 16 and length >= 4.
pub(crate) fn emit_copy(dst: &mut [u8], offset: usize, mut length: usize) -> usize {
    let mut i: usize = 0;

    while length > 0 {
        if offset < 1 << 11 && length >= 4 && length < 12 {
            dst[i] = ((offset >> 8) as u8 & 0x07) << 5 | ((length - 4) as u8) << 2 | TAG_COPY_1;
            dst[i + 1] = offset as u8;
            return i + 2;
        }

        let x = length.min(1 << 6);
        dst[i] = ((x - 1) as u8) << 2 | TAG_COPY_2;
        LittleEndian::write_u16(&mut dst[i + 1..], offset as u16);
        i += 3;
        length -= x;
    }
    i
}

// max_compressed_len returns the maximum length of a snappy block, given its
// uncompressed length.
//
// A trailing literal run costs at most 62 bytes per 60 of input. The worst
// item is a one-byte literal followed by a five-byte copy at a large offset:
// 6 bytes of input become 7 bytes of output, hence n/6.
//
// Saturates at usize::MAX; no block that long can be compressed anyway.
pub fn max_compressed_len(src_len: usize) -> usize {
    src_len.saturating_add(32).saturating_add(src_len / 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_size_follows_block_length() {
        let mut table = MatchTable::new();
        assert_eq!(table.reset(5), 256);
        assert_eq!(table.reset(256), 256);
        assert_eq!(table.reset(257), 512);
        assert_eq!(table.reset(5000), 8192);
        assert_eq!(table.reset(1 << 20), 1 << 14);
    }

    #[test]
    fn hash_stays_within_table() {
        let mut table = MatchTable::new();
        let size = table.reset(300);
        for &word in &[0u32, 1, 0xdead_beef, u32::MAX] {
            assert!(table.hash(word) < size);
        }
    }

    #[test]
    fn swap_returns_previous_position() {
        let mut table = MatchTable::new();
        table.reset(1000);
        assert_eq!(table.swap(0x6162_6364, 3), -1);
        assert_eq!(table.swap(0x6162_6364, 10), 3);
        assert_eq!(table.swap(0x6162_6364, 11), 10);
        table.reset(1000);
        assert_eq!(table.swap(0x6162_6364, 0), -1);
    }

    #[test]
    fn literal_inline_length() {
        let mut dst = [0u8; 8];
        assert_eq!(emit_literal(&mut dst, b"abc"), 4);
        assert_eq!(&dst[..4], &[2 << 2, b'a', b'b', b'c']);
    }

    #[test]
    fn literal_extra_length_bytes() {
        let mut dst = vec![0u8; 70_000];

        // 60 bytes is the longest inline length.
        let lit = vec![7u8; 60];
        assert_eq!(emit_literal(&mut dst, &lit), 61);
        assert_eq!(dst[0], 59 << 2);

        let lit = vec![7u8; 61];
        assert_eq!(emit_literal(&mut dst, &lit), 63);
        assert_eq!(&dst[..2], &[60 << 2, 60]);

        let lit = vec![7u8; 256];
        assert_eq!(emit_literal(&mut dst, &lit), 258);
        assert_eq!(&dst[..2], &[60 << 2, 255]);

        let lit = vec![7u8; 257];
        assert_eq!(emit_literal(&mut dst, &lit), 260);
        assert_eq!(&dst[..3], &[61 << 2, 0x00, 0x01]);

        let lit = vec![7u8; 65_537];
        assert_eq!(emit_literal(&mut dst, &lit), 65_541);
        assert_eq!(&dst[..4], &[62 << 2, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn copy_short_form() {
        let mut dst = [0u8; 8];
        assert_eq!(emit_copy(&mut dst, 0x3ff, 7), 2);
        assert_eq!(&dst[..2], &[(0x03 << 5) | (3 << 2) | TAG_COPY_1, 0xff]);
    }

    #[test]
    fn copy_long_form_for_far_offsets() {
        let mut dst = [0u8; 8];
        assert_eq!(emit_copy(&mut dst, 2048, 4), 3);
        assert_eq!(&dst[..3], &[(3 << 2) | TAG_COPY_2, 0x00, 0x08]);
    }

    #[test]
    fn copy_splits_into_64_byte_chunks() {
        let mut dst = [0u8; 16];
        // 64 + 8: one long chunk, then the short form finishes.
        assert_eq!(emit_copy(&mut dst, 1, 72), 5);
        assert_eq!(&dst[..3], &[(63 << 2) | TAG_COPY_2, 0x01, 0x00]);
        assert_eq!(&dst[3..5], &[(4 << 2) | TAG_COPY_1, 0x01]);

        // 64 + 66 (64 + 2): the remainder below 4 stays in long form.
        assert_eq!(emit_copy(&mut dst, 1, 130), 9);
        assert_eq!(dst[6], (1 << 2) | TAG_COPY_2);
    }

    #[test]
    fn literal_four_length_bytes() {
        let mut dst = vec![0u8; (1 << 24) + 8];
        let lit = vec![7u8; (1 << 24) + 1];
        assert_eq!(emit_literal(&mut dst, &lit), (1 << 24) + 6);
        assert_eq!(&dst[..5], &[63 << 2, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn max_len_saturates() {
        assert_eq!(max_compressed_len(0), 32);
        assert_eq!(max_compressed_len(600), 732);
        assert_eq!(max_compressed_len(usize::MAX), usize::MAX);
        assert_eq!(max_compressed_len(usize::MAX - 40), usize::MAX);
    }

    #[test]
    fn empty_block_is_one_header_byte() {
        let mut dst = [0xffu8; 32];
        assert_eq!(compress(&mut dst, &[]).unwrap(), 1);
        assert_eq!(dst[0], 0x00);
    }

    #[test]
    fn short_block_is_single_literal() {
        let mut dst = [0u8; 40];
        assert_eq!(compress(&mut dst, b"abcd").unwrap(), 6);
        assert_eq!(&dst[..6], &[4, 3 << 2, b'a', b'b', b'c', b'd']);
    }

    #[test]
    fn run_becomes_literal_and_copy() {
        let src = [b'a'; 20];
        let mut dst = [0u8; 64];
        let n = compress(&mut dst, &src).unwrap();
        assert_eq!(
            &dst[..n],
            &[20, 0x00, b'a', (18 << 2) | TAG_COPY_2, 0x01, 0x00]
        );
    }

    #[test]
    fn rejects_small_destination() {
        let src = [0u8; 60];
        let mut dst = [0u8; 50];
        assert_eq!(
            compress(&mut dst, &src),
            Err(Error::BufferTooSmall { given: 50, min: 102 })
        );
    }
}
