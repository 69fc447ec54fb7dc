use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::definitions::*;
use crate::error::{Error, Result};
use crate::varint::get_uvarint;

/// The low two bits of a chunk's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Literal,
    ShortCopy,
    LongCopy,
    Reserved,
}

impl Tag {
    fn of(b: u8) -> Tag {
        match b & 0x03 {
            TAG_LITERAL => Tag::Literal,
            TAG_COPY_1 => Tag::ShortCopy,
            TAG_COPY_2 => Tag::LongCopy,
            _ => Tag::Reserved,
        }
    }
}

/// One decoded chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    /// `len` raw bytes follow the header.
    Literal { len: usize },
    /// Repeat `len` bytes starting `offset` bytes back in the output.
    Copy { offset: usize, len: usize },
}

impl Item {
    /// Parses the chunk header at the front of `src`, returning the item and
    /// the number of header bytes it occupies. A literal's payload is not
    /// included in that count.
    pub fn parse(src: &[u8]) -> Result<(Item, usize)> {
        let tag = *src.first().ok_or(Error::Truncated)?;

        match Tag::of(tag) {
            Tag::Literal => {
                let x = tag >> 2;
                if x < LITERAL_LEN_1 {
                    return Ok((Item::Literal { len: x as usize + 1 }, 1));
                }
                let extra = (x - LITERAL_LEN_1 + 1) as usize;
                if src.len() < 1 + extra {
                    return Err(Error::Truncated);
                }
                let n = LittleEndian::read_uint(&src[1..], extra);
                let len = n as usize;
                if len as u64 != n || len == usize::MAX {
                    return Err(Error::Corrupt("literal length out of range"));
                }
                Ok((Item::Literal { len: len + 1 }, 1 + extra))
            }
            Tag::ShortCopy => {
                if src.len() < 2 {
                    return Err(Error::Truncated);
                }
                let len = 4 + ((tag >> 2) & 0x07) as usize;
                let offset = ((tag & 0xe0) as usize) << 3 | src[1] as usize;
                Ok((Item::Copy { offset, len }, 2))
            }
            Tag::LongCopy => {
                if src.len() < 3 {
                    return Err(Error::Truncated);
                }
                let len = 1 + (tag >> 2) as usize;
                let offset = LittleEndian::read_u16(&src[1..]) as usize;
                Ok((Item::Copy { offset, len }, 3))
            }
            Tag::Reserved => Err(Error::Corrupt("unsupported COPY_4 tag")),
        }
    }
}

// Reads the block header, returning the decoded length and the header size.
pub(crate) fn read_header(src: &[u8]) -> Result<(usize, usize)> {
    let (v, n) = get_uvarint(src).map_err(|_| Error::Corrupt("invalid length header"))?;
    if v > MAX_BLOCK_LEN as u64 {
        return Err(Error::Corrupt("decoded length too large"));
    }
    Ok((v as usize, n))
}

// decompressed_len returns the length of the decoded block.
pub fn decompressed_len(src: &[u8]) -> Result<usize> {
    read_header(src).map(|(len, _)| len)
}

// Decompress writes the decoded form of src into dst and returns the length
// written.
// Returns an error if src is malformed or dst is not large enough to hold
// the entire decoded block.
pub fn decompress(dst: &mut [u8], src: &[u8]) -> Result<usize> {
    decompress_block(dst, src)
}

/// Decompresses `src` into a freshly allocated buffer.
///
/// The buffer is sized from the block header before any item is checked,
/// so a hostile header can request up to `MAX_BLOCK_LEN` bytes. Callers
/// handling untrusted input should check `decompressed_len` first or use
/// `decompress` with a buffer of their own.
pub fn decompress_vec(src: &[u8]) -> Result<Vec<u8>> {
    let mut dst = vec![0; decompressed_len(src)?];
    decompress_block(&mut dst, src)?;
    Ok(dst)
}

// Decodes the block filling all of src into the front of dst.
pub(crate) fn decompress_block(dst: &mut [u8], src: &[u8]) -> Result<usize> {
    let (d_len, mut s) = read_header(src)?;
    if dst.len() < d_len {
        return Err(Error::BufferTooSmall {
            given: dst.len(),
            min: d_len,
        });
    }
    let dst = &mut dst[..d_len];
    let mut d: usize = 0;

    while s < src.len() {
        let (item, n) = Item::parse(&src[s..])?;
        s += n;

        match item {
            Item::Literal { len } => {
                if len > src.len() - s {
                    return Err(Error::Truncated);
                }
                if len > dst.len() - d {
                    return Err(Error::Corrupt("literal overruns decoded length"));
                }
                dst[d..d + len].copy_from_slice(&src[s..s + len]);
                d += len;
                s += len;
            }
            Item::Copy { offset, len } => {
                if offset == 0 || offset > d {
                    return Err(Error::Corrupt("copy offset out of range"));
                }
                if len > dst.len() - d {
                    return Err(Error::Corrupt("copy overruns decoded length"));
                }
                // Byte at a time: offset < len repeats bytes written by this
                // same copy.
                let end = d + len;
                while d < end {
                    dst[d] = dst[d - offset];
                    d += 1;
                }
            }
        }
    }

    if d != d_len {
        return Err(Error::Corrupt("decoded length mismatch"));
    }
    trace!("snappy: decompressed {} bytes into {}", src.len(), d);
    Ok(d)
}
