//! Wire primitives - little-endian scalars, varint-prefixed strings and
//! 16-byte decimals.
//!
//! `WireWriter` appends into an owned buffer and cannot fail.
//! `WireReader` walks a borrowed slice and reports truncation as
//! `MalformedData` instead of panicking.

use arrayvec::ArrayVec;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Longest 7-bit varint encoding of a `u32`
const MAX_VARINT_LEN: usize = 5;

/// Append-only encoder.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[inline]
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Unsigned LEB128, at most five bytes.
    pub fn put_varint(&mut self, mut value: u32) {
        let mut bytes: ArrayVec<u8, MAX_VARINT_LEN> = ArrayVec::new();
        while value >= 0x80 {
            bytes.push((value as u8) | 0x80);
            value >>= 7;
        }
        bytes.push(value as u8);
        self.buf.extend_from_slice(&bytes);
    }

    /// UTF-8 bytes behind a varint length prefix
    pub fn put_str(&mut self, value: &str) {
        self.put_varint(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// `Decimal::serialize` form, 16 bytes
    pub fn put_decimal(&mut self, value: Decimal) {
        self.buf.extend_from_slice(&value.serialize());
    }

    /// Overwrite four bytes at `offset` (used to backfill length prefixes)
    pub(crate) fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked decoder over a byte slice.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::malformed(format!(
                "unexpected end of data: needed {} bytes at offset {}, {} left",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline]
    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn get_u16(&mut self) -> Result<u16> {
        self.array().map(u16::from_le_bytes)
    }

    #[inline]
    pub fn get_u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_le_bytes)
    }

    #[inline]
    pub fn get_i32(&mut self) -> Result<i32> {
        self.array().map(i32::from_le_bytes)
    }

    pub fn get_varint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.get_u8()?;
            let bits = (byte & 0x7f) as u32;
            // Fifth byte may only carry the top four bits
            if i == MAX_VARINT_LEN - 1 && bits > 0x0f {
                return Err(Error::malformed("varint overflows u32"));
            }
            value |= bits << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::malformed("varint longer than five bytes"))
    }

    pub fn get_str(&mut self) -> Result<String> {
        let len = self.get_varint()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::malformed(format!("invalid UTF-8 string: {}", e)))
    }

    pub fn get_decimal(&mut self) -> Result<Decimal> {
        let bytes: [u8; 16] = self.array()?;
        // Decimal::deserialize masks the flags itself; reject scales it cannot hold
        if bytes[2] > 28 {
            return Err(Error::malformed(format!("decimal scale {} out of range", bytes[2])));
        }
        Ok(Decimal::deserialize(bytes))
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_scalars_little_endian() {
        let mut w = WireWriter::new();
        w.put_u8(7);
        w.put_u16(0x0102);
        w.put_u32(0x01020304);
        w.put_i32(-2);
        assert_eq!(
            w.as_slice(),
            &[7, 0x02, 0x01, 0x04, 0x03, 0x02, 0x01, 0xfe, 0xff, 0xff, 0xff]
        );

        let bytes = w.into_inner();
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.get_u8().unwrap(), 7);
        assert_eq!(r.get_u16().unwrap(), 0x0102);
        assert_eq!(r.get_u32().unwrap(), 0x01020304);
        assert_eq!(r.get_i32().unwrap(), -2);
        assert!(r.is_empty());
    }

    #[test]
    fn test_varint_boundaries() {
        let mut w = WireWriter::new();
        w.put_varint(0);
        w.put_varint(127);
        w.put_varint(128);
        w.put_varint(u32::MAX);
        assert_eq!(w.len(), 1 + 1 + 2 + 5);
        assert_eq!(&w.as_slice()[2..4], &[0x80, 0x01]);

        let bytes = w.into_inner();
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.get_varint().unwrap(), 0);
        assert_eq!(r.get_varint().unwrap(), 127);
        assert_eq!(r.get_varint().unwrap(), 128);
        assert_eq!(r.get_varint().unwrap(), u32::MAX);
    }

    #[test]
    fn test_varint_overflow_rejected() {
        let mut r = WireReader::new(&[0xff, 0xff, 0xff, 0xff, 0x7f]);
        assert!(matches!(r.get_varint(), Err(Error::MalformedData { .. })));

        let mut r = WireReader::new(&[0x80, 0x80]);
        assert!(r.get_varint().is_err());
    }

    #[test]
    fn test_string_and_decimal() {
        let price = Decimal::from_str("19.99").unwrap();
        let mut w = WireWriter::new();
        w.put_str("crème brûlée");
        w.put_decimal(price);
        let bytes = w.into_inner();

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.get_str().unwrap(), "crème brûlée");
        assert_eq!(r.get_decimal().unwrap(), price);
    }

    #[test]
    fn test_truncated_reads() {
        let mut r = WireReader::new(&[1, 2]);
        assert!(matches!(r.get_u32(), Err(Error::MalformedData { .. })));
        // Failed read does not advance
        assert_eq!(r.position(), 0);

        // Length prefix promises more bytes than exist
        let mut r = WireReader::new(&[5, b'a', b'b']);
        assert!(r.get_str().is_err());
    }

    #[test]
    fn test_invalid_utf8() {
        let mut r = WireReader::new(&[2, 0xc3, 0x28]);
        assert!(matches!(r.get_str(), Err(Error::MalformedData { .. })));
    }

    #[test]
    fn test_patch_u32() {
        let mut w = WireWriter::new();
        w.put_u32(0);
        w.put_u8(9);
        w.patch_u32(0, 1);
        assert_eq!(w.as_slice(), &[1, 0, 0, 0, 9]);
    }
}
