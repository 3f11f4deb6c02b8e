//! Variable-length integers.
//!
//! Seven data bits per byte, high bit as a continuation flag, least
//! significant group first. Signed values are zigzag-mapped first so that
//! small magnitudes of either sign stay short. Encoding is minimal-length;
//! decoding rejects any VInt whose bits do not fit the announced width.

use crate::{errors::DecodeError, source::ByteSource};
use std::convert::TryFrom;

/// Maps an `i64` onto the unsigned line, interleaving signs.
#[inline]
pub(crate) fn zigzag64(i: i64) -> u64 { ((i << 1) ^ (i >> 63)) as u64 }

/// Inverse of [`zigzag64`].
#[inline]
pub(crate) fn unzigzag64(u: u64) -> i64 { ((u >> 1) as i64) ^ -((u & 1) as i64) }

/// Maps an `i32` onto the unsigned line, interleaving signs.
#[inline]
pub(crate) fn zigzag32(i: i32) -> u32 { ((i << 1) ^ (i >> 31)) as u32 }

/// Inverse of [`zigzag32`].
#[inline]
pub(crate) fn unzigzag32(u: u32) -> i32 { ((u >> 1) as i32) ^ -((u & 1) as i32) }

/// Appends `u` to `out` as a minimal-length VInt.
pub(crate) fn write_u64(out: &mut Vec<u8>, mut u: u64) {
    loop {
        let group = (u & 0x7f) as u8;
        u >>= 7;
        if u == 0 {
            out.push(group);
            return;
        }
        out.push(group | 0x80);
    }
}

/// Appends `u` to `out` as a minimal-length VInt.
pub(crate) fn write_u32(out: &mut Vec<u8>, u: u32) { write_u64(out, u as u64) }

/// Appends `i` to `out`, zigzag-mapped.
pub(crate) fn write_i64(out: &mut Vec<u8>, i: i64) { write_u64(out, zigzag64(i)) }

/// Appends `i` to `out`, zigzag-mapped.
pub(crate) fn write_i32(out: &mut Vec<u8>, i: i32) { write_u32(out, zigzag32(i)) }

/// Reads a VInt bounded to 64 bits.
///
/// `what` names the field being decoded, for truncation errors.
pub(crate) fn read_u64<S: ByteSource>(src: &mut S, what: &'static str) -> Result<u64, DecodeError> {
    let mut total: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        if shift >= 64 {
            return Err(DecodeError::MalformedVarInt { width: 64 });
        }
        let byte = src.read_byte(what)?;
        let group = (byte & 0x7f) as u64;
        let shifted = group << shift;
        // a dropped bit means the group does not fit in the width
        if shifted >> shift != group {
            return Err(DecodeError::MalformedVarInt { width: 64 });
        }
        total |= shifted;
        if byte & 0x80 == 0 {
            return Ok(total);
        }
        shift += 7;
    }
}

/// Reads a VInt bounded to 32 bits.
pub(crate) fn read_u32<S: ByteSource>(src: &mut S, what: &'static str) -> Result<u32, DecodeError> {
    let mut total: u32 = 0;
    let mut shift: u32 = 0;
    loop {
        if shift >= 32 {
            return Err(DecodeError::MalformedVarInt { width: 32 });
        }
        let byte = src.read_byte(what)?;
        let group = (byte & 0x7f) as u32;
        let shifted = group << shift;
        if shifted >> shift != group {
            return Err(DecodeError::MalformedVarInt { width: 32 });
        }
        total |= shifted;
        if byte & 0x80 == 0 {
            return Ok(total);
        }
        shift += 7;
    }
}

/// Reads a zigzag VInt bounded to 64 bits.
pub(crate) fn read_i64<S: ByteSource>(src: &mut S, what: &'static str) -> Result<i64, DecodeError> {
    read_u64(src, what).map(unzigzag64)
}

/// Reads a zigzag VInt bounded to 32 bits.
pub(crate) fn read_i32<S: ByteSource>(src: &mut S, what: &'static str) -> Result<i32, DecodeError> {
    read_u32(src, what).map(unzigzag32)
}

/// Reads a VInt length field and bounds it to the address space.
pub(crate) fn read_len<S: ByteSource>(
    src: &mut S,
    what: &'static str,
) -> Result<usize, DecodeError> {
    let raw = read_u64(src, what)?;
    usize::try_from(raw).map_err(|_| DecodeError::LengthOverflow { len: raw })
}
