//! Appends protobuf tags and payloads to an output buffer
//!
//! [`Writer`] mirrors the reader one operation at a time: every `write_*`
//! here has a `read_*` counterpart in [`crate::reader`]. The backing store is
//! abstracted behind [`WriterBackend`] so the same writer serves a growable
//! `Vec<u8>` (through `std::io::Write`) and a caller-provided fixed slice.

use crate::errors::{Error, Result};
use crate::wire::{Tag, WireType};
use byteorder_lite::{ByteOrder, LittleEndian as LE};
use byteorder_lite::WriteBytesExt;

/// A protobuf writer over a [`WriterBackend`]
pub struct Writer<W: WriterBackend> {
    inner: W,
}

impl<W: WriterBackend> Writer<W> {
    /// Creates a new `Writer`
    pub fn new(w: W) -> Writer<W> {
        Writer { inner: w }
    }

    /// Writes a byte which is NOT internally coded as a varint
    pub fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.inner.pb_write_u8(byte)
    }

    /// Writes a varint: seven bits per byte, continuation bit on all but the last
    pub fn write_varint(&mut self, mut v: u64) -> Result<()> {
        while v > 0x7f {
            self.inner.pb_write_u8(((v as u8) & 0x7f) | 0x80)?;
            v >>= 7;
        }
        self.inner.pb_write_u8(v as u8)
    }

    /// Writes a field tag: `(field_number << 3) | wire_type` as a varint
    #[inline(always)]
    pub fn write_tag(&mut self, field: u32, wire_type: WireType) -> Result<()> {
        self.write_varint(u64::from(Tag::pack(field, wire_type)))
    }

    /// Writes an `int32` which is internally coded as a varint
    ///
    /// Negative values sign-extend to ten bytes, as the wire format requires.
    #[inline(always)]
    pub fn write_int32(&mut self, v: i32) -> Result<()> {
        self.write_varint(i64::from(v) as u64)
    }

    /// Writes an `int64` which is internally coded as a varint
    #[inline(always)]
    pub fn write_int64(&mut self, v: i64) -> Result<()> {
        self.write_varint(v as u64)
    }

    /// Writes a `uint32` which is internally coded as a varint
    #[inline(always)]
    pub fn write_uint32(&mut self, v: u32) -> Result<()> {
        self.write_varint(u64::from(v))
    }

    /// Writes a `uint64` which is internally coded as a varint
    #[inline(always)]
    pub fn write_uint64(&mut self, v: u64) -> Result<()> {
        self.write_varint(v)
    }

    /// Writes a `sint32`, zig-zag mapped before the varint stage
    ///
    /// The mapping stays in 32 bits so small-magnitude negatives keep their
    /// short encodings (`-1` is one byte, `i32::MIN` is five, never ten).
    #[inline(always)]
    pub fn write_sint32(&mut self, v: i32) -> Result<()> {
        self.write_varint(u64::from(((v << 1) ^ (v >> 31)) as u32))
    }

    /// Writes a `sint64`, zig-zag mapped before the varint stage
    #[inline(always)]
    pub fn write_sint64(&mut self, v: i64) -> Result<()> {
        self.write_varint(((v << 1) ^ (v >> 63)) as u64)
    }

    /// Writes a `fixed64` as a little endian u64
    #[inline(always)]
    pub fn write_fixed64(&mut self, v: u64) -> Result<()> {
        self.inner.pb_write_u64(v)
    }

    /// Writes a `fixed32` as a little endian u32
    #[inline(always)]
    pub fn write_fixed32(&mut self, v: u32) -> Result<()> {
        self.inner.pb_write_u32(v)
    }

    /// Writes a `sfixed64` as a little endian i64
    #[inline(always)]
    pub fn write_sfixed64(&mut self, v: i64) -> Result<()> {
        self.inner.pb_write_i64(v)
    }

    /// Writes a `sfixed32` as a little endian i32
    #[inline(always)]
    pub fn write_sfixed32(&mut self, v: i32) -> Result<()> {
        self.inner.pb_write_i32(v)
    }

    /// Writes a `float`
    #[inline(always)]
    pub fn write_float(&mut self, v: f32) -> Result<()> {
        self.inner.pb_write_f32(v)
    }

    /// Writes a `double`
    #[inline(always)]
    pub fn write_double(&mut self, v: f64) -> Result<()> {
        self.inner.pb_write_f64(v)
    }

    /// Writes a `bool`: 1 = true, 0 = false
    #[inline(always)]
    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.inner.pb_write_u8(u8::from(v))
    }

    /// Writes an `enum` as its int32 wire value
    #[inline(always)]
    pub fn write_enum(&mut self, v: i32) -> Result<()> {
        self.write_int32(v)
    }

    /// Writes `bytes`: varint length prefix, then the chunk of data
    #[inline(always)]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_varint(bytes.len() as u64)?;
        self.inner.pb_write_all(bytes)
    }

    /// Writes a `string`: varint length prefix, then the utf-8 bytes
    #[inline(always)]
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Writes already-encoded bytes with no length prefix
    ///
    /// Used to replay preserved unknown fields, whose captured span already
    /// includes tag and framing.
    #[inline(always)]
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.pb_write_all(bytes)
    }
}

/// Writer backend abstraction
pub trait WriterBackend {
    /// Write a u8
    fn pb_write_u8(&mut self, x: u8) -> Result<()>;

    /// Write a u32
    fn pb_write_u32(&mut self, x: u32) -> Result<()>;

    /// Write a i32
    fn pb_write_i32(&mut self, x: i32) -> Result<()>;

    /// Write a f32
    fn pb_write_f32(&mut self, x: f32) -> Result<()>;

    /// Write a u64
    fn pb_write_u64(&mut self, x: u64) -> Result<()>;

    /// Write a i64
    fn pb_write_i64(&mut self, x: i64) -> Result<()>;

    /// Write a f64
    fn pb_write_f64(&mut self, x: f64) -> Result<()>;

    /// Write all bytes in buf
    fn pb_write_all(&mut self, buf: &[u8]) -> Result<()>;
}

/// A writer backend for fixed-size byte buffers
///
/// Never allocates; fails with [`Error::OutputBufferTooSmall`] when the slice
/// fills up.
pub struct BytesWriter<'a> {
    buf: &'a mut [u8],
    cursor: usize,
}

impl<'a> BytesWriter<'a> {
    /// Create a new `BytesWriter` to write into `buf`
    pub fn new(buf: &'a mut [u8]) -> BytesWriter<'a> {
        BytesWriter { buf, cursor: 0 }
    }

    /// Number of bytes written so far
    pub fn written(&self) -> usize {
        self.cursor
    }
}

impl<'a> BytesWriter<'a> {
    #[inline(always)]
    fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        if self.buf.len() - self.cursor < n {
            Err(Error::OutputBufferTooSmall)
        } else {
            let chunk = &mut self.buf[self.cursor..self.cursor + n];
            self.cursor += n;
            Ok(chunk)
        }
    }
}

impl<'a> WriterBackend for BytesWriter<'a> {
    #[inline(always)]
    fn pb_write_u8(&mut self, x: u8) -> Result<()> {
        self.reserve(1).map(|chunk| chunk[0] = x)
    }

    #[inline(always)]
    fn pb_write_u32(&mut self, x: u32) -> Result<()> {
        self.reserve(4).map(|chunk| LE::write_u32(chunk, x))
    }

    #[inline(always)]
    fn pb_write_i32(&mut self, x: i32) -> Result<()> {
        self.reserve(4).map(|chunk| LE::write_i32(chunk, x))
    }

    #[inline(always)]
    fn pb_write_f32(&mut self, x: f32) -> Result<()> {
        self.reserve(4).map(|chunk| LE::write_f32(chunk, x))
    }

    #[inline(always)]
    fn pb_write_u64(&mut self, x: u64) -> Result<()> {
        self.reserve(8).map(|chunk| LE::write_u64(chunk, x))
    }

    #[inline(always)]
    fn pb_write_i64(&mut self, x: i64) -> Result<()> {
        self.reserve(8).map(|chunk| LE::write_i64(chunk, x))
    }

    #[inline(always)]
    fn pb_write_f64(&mut self, x: f64) -> Result<()> {
        self.reserve(8).map(|chunk| LE::write_f64(chunk, x))
    }

    #[inline(always)]
    fn pb_write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.reserve(buf.len()).map(|chunk| chunk.copy_from_slice(buf))
    }
}

impl<W: std::io::Write> WriterBackend for W {
    #[inline(always)]
    fn pb_write_u8(&mut self, x: u8) -> Result<()> {
        self.write_u8(x).map_err(|e| e.into())
    }

    #[inline(always)]
    fn pb_write_u32(&mut self, x: u32) -> Result<()> {
        self.write_u32::<LE>(x).map_err(|e| e.into())
    }

    #[inline(always)]
    fn pb_write_i32(&mut self, x: i32) -> Result<()> {
        self.write_i32::<LE>(x).map_err(|e| e.into())
    }

    #[inline(always)]
    fn pb_write_f32(&mut self, x: f32) -> Result<()> {
        self.write_f32::<LE>(x).map_err(|e| e.into())
    }

    #[inline(always)]
    fn pb_write_u64(&mut self, x: u64) -> Result<()> {
        self.write_u64::<LE>(x).map_err(|e| e.into())
    }

    #[inline(always)]
    fn pb_write_i64(&mut self, x: i64) -> Result<()> {
        self.write_i64::<LE>(x).map_err(|e| e.into())
    }

    #[inline(always)]
    fn pb_write_f64(&mut self, x: f64) -> Result<()> {
        self.write_f64::<LE>(x).map_err(|e| e.into())
    }

    #[inline(always)]
    fn pb_write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.write_all(buf).map_err(|e| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::BytesReader;

    fn into_vec<F: FnOnce(&mut Writer<&mut Vec<u8>>) -> Result<()>>(f: F) -> Vec<u8> {
        let mut out = Vec::new();
        let mut w = Writer::new(&mut out);
        f(&mut w).unwrap();
        out
    }

    #[test]
    fn varint_encoded_lengths() {
        assert_eq!(into_vec(|w| w.write_varint(0)), [0x00]);
        assert_eq!(into_vec(|w| w.write_varint(127)), [0x7f]);
        assert_eq!(into_vec(|w| w.write_varint(128)), [0x80, 0x01]);
        assert_eq!(into_vec(|w| w.write_varint(150)), [0x96, 0x01]);
        assert_eq!(into_vec(|w| w.write_varint(16_383)).len(), 2);
        assert_eq!(into_vec(|w| w.write_varint(16_384)).len(), 3);
        assert_eq!(into_vec(|w| w.write_varint(u64::MAX)).len(), 10);
    }

    #[test]
    fn tag_byte_matches_wire_format() {
        assert_eq!(into_vec(|w| w.write_tag(1, WireType::Varint)), [0x08]);
        assert_eq!(
            into_vec(|w| w.write_tag(2, WireType::LengthDelimited)),
            [0x12]
        );
    }

    #[test]
    fn negative_int32_sign_extends_to_ten_bytes() {
        assert_eq!(into_vec(|w| w.write_int32(-1)).len(), 10);
        let bytes = into_vec(|w| w.write_int32(-1));
        let mut r = BytesReader::from_bytes(&bytes);
        assert_eq!(r.read_int32(&bytes).unwrap(), -1);
    }

    #[test]
    fn sint32_stays_compact() {
        assert_eq!(into_vec(|w| w.write_sint32(-1)), [0x01]);
        assert_eq!(into_vec(|w| w.write_sint32(1)), [0x02]);
        // i32::MIN maps to u32::MAX: five bytes, not a sign-extended ten
        assert_eq!(into_vec(|w| w.write_sint32(i32::MIN)).len(), 5);
    }

    #[test]
    fn sint64_round_trips_extremes() {
        for v in [0i64, -1, 1, i64::MIN, i64::MAX] {
            let bytes = into_vec(|w| w.write_sint64(v));
            let mut r = BytesReader::from_bytes(&bytes);
            assert_eq!(r.read_sint64(&bytes).unwrap(), v);
        }
    }

    #[test]
    fn bytes_carry_length_prefix() {
        assert_eq!(
            into_vec(|w| w.write_bytes(b"abc")),
            [0x03, b'a', b'b', b'c']
        );
        assert_eq!(into_vec(|w| w.write_string("")), [0x00]);
    }

    #[test]
    fn fixed_writes_are_little_endian() {
        assert_eq!(
            into_vec(|w| w.write_fixed32(1)),
            [0x01, 0x00, 0x00, 0x00]
        );
        assert_eq!(into_vec(|w| w.write_double(0.0)).len(), 8);
    }

    #[test]
    fn bytes_writer_reports_overflow() {
        let mut buf = [0u8; 2];
        let mut w = Writer::new(BytesWriter::new(&mut buf));
        w.write_u8(1).unwrap();
        w.write_u8(2).unwrap();
        assert!(matches!(w.write_u8(3), Err(Error::OutputBufferTooSmall)));
    }

    #[test]
    fn bytes_writer_tracks_written() {
        let mut buf = [0u8; 16];
        let mut bw = BytesWriter::new(&mut buf);
        bw.pb_write_all(b"abcd").unwrap();
        assert_eq!(bw.written(), 4);
    }
}
