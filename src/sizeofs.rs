//! Byte counts of protobuf encodings
//!
//! Length-delimited framing needs every payload size before the payload is
//! written, so each wire encoding gets a `sizeof_*` mirror here. These must
//! stay in lockstep with the corresponding `write_*` methods.

use crate::wire::{Tag, WireType};

/// Computes the number of bytes `v` occupies as a varint
#[inline(always)]
pub fn sizeof_varint(v: u64) -> usize {
    match v {
        0x0..=0x7f => 1,
        0x80..=0x3fff => 2,
        0x4000..=0x1f_ffff => 3,
        0x20_0000..=0xfff_ffff => 4,
        0x1000_0000..=0x7_ffff_ffff => 5,
        0x8_0000_0000..=0x3ff_ffff_ffff => 6,
        0x400_0000_0000..=0x1_ffff_ffff_ffff => 7,
        0x2_0000_0000_0000..=0xff_ffff_ffff_ffff => 8,
        0x100_0000_0000_0000..=0x7fff_ffff_ffff_ffff => 9,
        _ => 10,
    }
}

/// Computes the number of bytes a field tag occupies
#[inline]
pub fn sizeof_tag(field: u32, wire_type: WireType) -> usize {
    sizeof_varint(u64::from(Tag::pack(field, wire_type)))
}

/// Computes the number of bytes an `int32` occupies as a varint
#[inline]
pub fn sizeof_int32(v: i32) -> usize {
    sizeof_varint(i64::from(v) as u64)
}

/// Computes the number of bytes an `int64` occupies as a varint
#[inline]
pub fn sizeof_int64(v: i64) -> usize {
    sizeof_varint(v as u64)
}

/// Computes the number of bytes a `uint32` occupies as a varint
#[inline]
pub fn sizeof_uint32(v: u32) -> usize {
    sizeof_varint(u64::from(v))
}

/// Computes the number of bytes a `uint64` occupies as a varint
#[inline]
pub fn sizeof_uint64(v: u64) -> usize {
    sizeof_varint(v)
}

/// Computes the number of bytes a `sint32` occupies once zig-zag mapped
#[inline]
pub fn sizeof_sint32(v: i32) -> usize {
    sizeof_varint(u64::from(((v << 1) ^ (v >> 31)) as u32))
}

/// Computes the number of bytes a `sint64` occupies once zig-zag mapped
#[inline]
pub fn sizeof_sint64(v: i64) -> usize {
    sizeof_varint(((v << 1) ^ (v >> 63)) as u64)
}

/// Computes the number of bytes a `bool` occupies as a varint
#[inline]
pub fn sizeof_bool(_: bool) -> usize {
    1
}

/// Computes the number of bytes an `enum` occupies as an int32 varint
#[inline]
pub fn sizeof_enum(v: i32) -> usize {
    sizeof_int32(v)
}

/// Computes the number of bytes a length-delimited payload occupies,
/// prefix included
#[inline]
pub fn sizeof_len(len: usize) -> usize {
    sizeof_varint(len as u64) + len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_size_boundaries() {
        assert_eq!(sizeof_varint(0), 1);
        assert_eq!(sizeof_varint(127), 1);
        assert_eq!(sizeof_varint(128), 2);
        assert_eq!(sizeof_varint(16_383), 2);
        assert_eq!(sizeof_varint(16_384), 3);
        assert_eq!(sizeof_varint(u64::from(u32::MAX)), 5);
        assert_eq!(sizeof_varint(u64::MAX), 10);
    }

    #[test]
    fn signed_sizes() {
        assert_eq!(sizeof_int32(-1), 10);
        assert_eq!(sizeof_int64(-1), 10);
        assert_eq!(sizeof_sint32(-1), 1);
        assert_eq!(sizeof_sint32(i32::MIN), 5);
        assert_eq!(sizeof_sint64(-1), 1);
        assert_eq!(sizeof_sint64(i64::MIN), 10);
    }

    #[test]
    fn len_includes_prefix() {
        assert_eq!(sizeof_len(0), 1);
        assert_eq!(sizeof_len(127), 128);
        assert_eq!(sizeof_len(128), 130);
    }

    #[test]
    fn tag_size() {
        assert_eq!(sizeof_tag(1, WireType::Varint), 1);
        assert_eq!(sizeof_tag(15, WireType::Fixed32), 1);
        assert_eq!(sizeof_tag(16, WireType::Varint), 2);
    }
}
