use log::debug;

use crate::compress::{compress_block, max_compressed_len, MatchTable};
use crate::decompress::{decompress_block, read_header};
use crate::error::{Error, Result};
use crate::region::Region;

/// A reversible transform from one byte region into another.
///
/// Both methods return `false` when the transform did not complete; the
/// destination may then hold partial output and the cursors are unspecified.
pub trait ByteFunction {
    fn forward(&mut self, src: &mut Region<&[u8]>, dst: &mut Region<&mut [u8]>) -> bool;

    fn inverse(&mut self, src: &mut Region<&[u8]>, dst: &mut Region<&mut [u8]>) -> bool;
}

/// Snappy block codec.
///
/// Each call handles one block: either the configured `size` bytes from the
/// source cursor or, when `size` is 0, everything the source region has
/// left. The codec keeps its match table between calls to avoid
/// reallocating it, which is why both transforms take `&mut self`: an
/// instance serves one operation at a time.
#[derive(Debug, Clone, Default)]
pub struct SnappyCodec {
    size: usize,
    table: MatchTable,
}

impl SnappyCodec {
    pub fn new() -> SnappyCodec {
        SnappyCodec::default()
    }

    pub fn with_size(size: i64) -> Result<SnappyCodec> {
        let mut codec = SnappyCodec::new();
        if !codec.set_size(size) {
            return Err(Error::InvalidSize(size));
        }
        Ok(codec)
    }

    /// The fixed block length, or 0 when blocks span the rest of the source.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Sets the fixed block length. Negative lengths are rejected and leave
    /// the setting unchanged.
    pub fn set_size(&mut self, size: i64) -> bool {
        if size < 0 || size as u64 > usize::MAX as u64 {
            return false;
        }
        self.size = size as usize;
        true
    }

    /// Worst case compressed size of a block of `src_len` bytes.
    pub fn max_encoded_length(src_len: usize) -> usize {
        max_compressed_len(src_len)
    }

    /// Reads the block header at the source cursor and returns the decoded
    /// length, moving the cursor past the header. Returns -1, leaving the
    /// cursor alone, if the header is invalid.
    pub fn decoded_len(src: &mut Region<&[u8]>) -> i64 {
        let header = match src.array.get(src.index..) {
            Some(header) => header,
            None => return -1,
        };
        match read_header(header) {
            Ok((len, n)) => {
                src.index += n;
                len as i64
            }
            Err(e) => {
                debug!("snappy: {}", e);
                -1
            }
        }
    }

    /// Compresses one block, advancing `src` past the block and `dst` past
    /// the bytes written.
    pub fn try_forward(&mut self, src: &mut Region<&[u8]>, dst: &mut Region<&mut [u8]>) -> Result<()> {
        let count = self.block_len(src)?;
        let start = src.index;
        let block = src.array.get(start..start + count).ok_or(Error::Truncated)?;

        let out_start = dst.index;
        let out = dst.array.get_mut(out_start..).unwrap_or(&mut []);

        let n = compress_block(out, block, &mut self.table)?;
        src.index = start + count;
        dst.index = out_start + n;
        Ok(())
    }

    /// Decompresses one block, advancing `src` past the block and `dst` past
    /// the bytes written.
    pub fn try_inverse(&mut self, src: &mut Region<&[u8]>, dst: &mut Region<&mut [u8]>) -> Result<()> {
        let count = self.block_len(src)?;
        let start = src.index;
        let block = src.array.get(start..start + count).ok_or(Error::Truncated)?;

        let out_start = dst.index;
        let out = dst.array.get_mut(out_start..).unwrap_or(&mut []);

        let n = decompress_block(out, block)?;
        src.index = start + count;
        dst.index = out_start + n;
        Ok(())
    }

    fn block_len(&self, src: &Region<&[u8]>) -> Result<usize> {
        let remaining = src.remaining();
        if self.size == 0 {
            return Ok(remaining);
        }
        if self.size > remaining {
            return Err(Error::Truncated);
        }
        Ok(self.size)
    }
}

impl ByteFunction for SnappyCodec {
    fn forward(&mut self, src: &mut Region<&[u8]>, dst: &mut Region<&mut [u8]>) -> bool {
        match self.try_forward(src, dst) {
            Ok(()) => true,
            Err(e) => {
                debug!("snappy: forward failed: {}", e);
                false
            }
        }
    }

    fn inverse(&mut self, src: &mut Region<&[u8]>, dst: &mut Region<&mut [u8]>) -> bool {
        match self.try_inverse(src, dst) {
            Ok(()) => true,
            Err(e) => {
                debug!("snappy: inverse failed: {}", e);
                false
            }
        }
    }
}
