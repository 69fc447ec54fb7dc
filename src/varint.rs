//! Base-128 little-endian varints, as used by the block length header.
//!
//! Every byte but the last has its high bit set; the low 7 bits of each byte
//! carry the value, least significant group first.

use crate::error::{Error, Result};

/// Maximum encoded length of a `u64` (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `put_uvarint` writes for `x`.
pub fn uvarint_len(mut x: u64) -> usize {
    let mut n = 1;
    while x >= 0x80 {
        x >>= 7;
        n += 1;
    }
    n
}

/// Writes `x` to the front of `dst` and returns the number of bytes written.
pub fn put_uvarint(dst: &mut [u8], mut x: u64) -> Result<usize> {
    let n = uvarint_len(x);
    if dst.len() < n {
        return Err(Error::BufferTooSmall {
            given: dst.len(),
            min: n,
        });
    }

    let mut i = 0;
    while x >= 0x80 {
        dst[i] = (x as u8) | 0x80;
        x >>= 7;
        i += 1;
    }
    dst[i] = x as u8;
    Ok(i + 1)
}

/// Reads a varint from the front of `src`, returning the value and the
/// number of bytes consumed.
///
/// Fails with `Overflow` when the value needs more than 64 bits and with
/// `Truncated` when `src` ends before the terminating byte.
pub fn get_uvarint(src: &[u8]) -> Result<(u64, usize)> {
    let mut x: u64 = 0;
    let mut s: u32 = 0;

    for (i, &b) in src.iter().enumerate() {
        if i == MAX_VARINT_LEN - 1 && b > 1 {
            // The tenth group holds bit 63 only.
            return Err(Error::Overflow);
        }
        if b < 0x80 {
            return Ok((x | (u64::from(b) << s), i + 1));
        }
        x |= u64::from(b & 0x7f) << s;
        s += 7;
    }
    Err(Error::Truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let cases: &[u64] = &[
            0,
            1,
            127,
            128,
            300,
            16383,
            16384,
            u32::MAX as u64,
            u64::MAX - 1,
            u64::MAX,
        ];
        let mut buf = [0u8; MAX_VARINT_LEN];
        for &v in cases {
            let n = put_uvarint(&mut buf, v).unwrap();
            assert_eq!(n, uvarint_len(v), "length mismatch for {}", v);
            assert_eq!(get_uvarint(&buf[..n]).unwrap(), (v, n), "roundtrip failed for {}", v);
        }
    }

    #[test]
    fn encoding_is_little_endian() {
        // 300 = 0b10_0101100: low group first.
        let mut buf = [0u8; MAX_VARINT_LEN];
        let n = put_uvarint(&mut buf, 300).unwrap();
        assert_eq!(&buf[..n], &[0xac, 0x02]);
    }

    #[test]
    fn max_value_uses_ten_bytes() {
        let mut buf = [0u8; MAX_VARINT_LEN];
        assert_eq!(put_uvarint(&mut buf, u64::MAX).unwrap(), 10);
        assert_eq!(buf[9], 0x01);
    }

    #[test]
    fn stops_at_first_terminator() {
        assert_eq!(get_uvarint(&[0x05, 0xff, 0xff]).unwrap(), (5, 1));
    }

    #[test]
    fn rejects_overlong() {
        let data = [0x80u8; 11];
        assert_eq!(get_uvarint(&data), Err(Error::Overflow));

        let mut data = [0xffu8; 10];
        data[9] = 0x02;
        assert_eq!(get_uvarint(&data), Err(Error::Overflow));
    }

    #[test]
    fn rejects_truncated() {
        assert_eq!(get_uvarint(&[]), Err(Error::Truncated));
        assert_eq!(get_uvarint(&[0x80, 0x80, 0x80]), Err(Error::Truncated));
    }

    #[test]
    fn put_checks_capacity() {
        let mut buf = [0u8; 1];
        assert_eq!(
            put_uvarint(&mut buf, 128),
            Err(Error::BufferTooSmall { given: 1, min: 2 })
        );
    }
}
