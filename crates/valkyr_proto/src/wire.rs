//! Schema codec for body payloads.
//!
//! Payload records are encoded field-by-field in declaration order:
//! fixed-width little-endian integers and `u16`-length-prefixed UTF-8
//! strings. [`WireWriter`] and [`WireReader`] are the primitive cursor
//! types; [`Wire`] is the trait the dispatch layer decodes through.

use crate::error::ProtoError;

/// A payload record that can be encoded to and decoded from body bytes.
pub trait Wire: Send + Sync + Sized {
    fn encode(&self) -> Vec<u8>;
    fn decode(buf: &[u8]) -> Result<Self, ProtoError>;
}

/// Append-only encoder for payload fields.
#[derive(Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Strings longer than `u16::MAX` bytes are truncated at the length
    /// prefix boundary; no modeled field comes anywhere near that limit.
    pub fn put_string(&mut self, v: &str) {
        let bytes = v.as_bytes();
        let len = bytes.len().min(u16::MAX as usize);
        self.put_u16(len as u16);
        self.buf.extend_from_slice(&bytes[..len]);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor decoder for payload fields.
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtoError> {
        if self.buf.len() - self.pos < n {
            return Err(ProtoError::Truncated {
                needed: n - (self.buf.len() - self.pos),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8, ProtoError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_u16(&mut self) -> Result<u16, ProtoError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn get_u32(&mut self) -> Result<u32, ProtoError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn get_u64(&mut self) -> Result<u64, ProtoError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn get_string(&mut self) -> Result<String, ProtoError> {
        let len = self.get_u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtoError::InvalidString)
    }

    /// Remaining undecoded bytes; non-zero after a full decode usually
    /// means client and server disagree on the record schema.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trip() {
        let mut w = WireWriter::new();
        w.put_u8(7);
        w.put_u16(0xbeef);
        w.put_u32(0xdead_beef);
        w.put_u64(u64::MAX - 1);
        w.put_string("valkyrie");
        let buf = w.finish();

        let mut r = WireReader::new(&buf);
        assert_eq!(r.get_u8().unwrap(), 7);
        assert_eq!(r.get_u16().unwrap(), 0xbeef);
        assert_eq!(r.get_u32().unwrap(), 0xdead_beef);
        assert_eq!(r.get_u64().unwrap(), u64::MAX - 1);
        assert_eq!(r.get_string().unwrap(), "valkyrie");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        let mut w = WireWriter::new();
        w.put_u16(2);
        let mut buf = w.finish();
        buf.extend_from_slice(&[0xff, 0xfe]);
        let mut r = WireReader::new(&buf);
        assert!(matches!(r.get_string(), Err(ProtoError::InvalidString)));
    }

    #[test]
    fn reader_reports_truncation() {
        let buf = [1u8, 0];
        let mut r = WireReader::new(&buf);
        assert!(matches!(r.get_u32(), Err(ProtoError::Truncated { .. })));
    }
}
