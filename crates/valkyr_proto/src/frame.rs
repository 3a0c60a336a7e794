//! Frame-level codec for the binary session protocol.
//!
//! A frame is the unit of transport: magic-delimited, length-prefixed, and
//! tagged with the opcode that selects the handler on the receiving side.
//! The frame codec is payload-agnostic; body bytes are decoded later by the
//! dispatch layer using the [`Wire`](crate::wire::Wire) schema codec.

use crate::error::ProtoError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Magic marker at the start of every frame.
pub const HEAD_MAGIC: u32 = 0x0123_4567;

/// Magic marker at the end of every frame.
pub const TAIL_MAGIC: u32 = 0x89ab_cdef;

/// Maximum accepted packet header length.
pub const MAX_HEADER_LEN: usize = 4 * 1024;

/// Maximum accepted body length.
pub const MAX_BODY_LEN: usize = 4 * 1024 * 1024;

/// One framed protocol message: opcode plus opaque header and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u16,
    pub header: Vec<u8>,
    pub body: Vec<u8>,
}

impl Frame {
    /// Creates a frame with an empty packet header.
    pub fn new(opcode: u16, body: Vec<u8>) -> Self {
        Self {
            opcode,
            header: Vec::new(),
            body,
        }
    }

    /// Serializes the frame into its wire representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + self.header.len() + self.body.len());
        buf.extend_from_slice(&HEAD_MAGIC.to_be_bytes());
        buf.extend_from_slice(&self.opcode.to_be_bytes());
        buf.extend_from_slice(&(self.header.len() as u16).to_be_bytes());
        buf.extend_from_slice(&(self.body.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.header);
        buf.extend_from_slice(&self.body);
        buf.extend_from_slice(&TAIL_MAGIC.to_be_bytes());
        buf
    }

    /// Parses one frame from a complete buffer.
    ///
    /// Rejects bad magic values, out-of-bounds length fields, and buffers
    /// shorter than the declared lengths.
    pub fn decode(buf: &[u8]) -> Result<Frame, ProtoError> {
        if buf.len() < 12 {
            return Err(ProtoError::Truncated {
                needed: 12 - buf.len(),
            });
        }
        let head = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if head != HEAD_MAGIC {
            return Err(ProtoError::BadMagic(head));
        }
        let opcode = u16::from_be_bytes([buf[4], buf[5]]);
        let header_len = u16::from_be_bytes([buf[6], buf[7]]) as usize;
        let body_len = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
        if header_len > MAX_HEADER_LEN || body_len > MAX_BODY_LEN {
            return Err(ProtoError::Oversized {
                header: header_len,
                body: body_len,
            });
        }
        let total = 12 + header_len + body_len + 4;
        if buf.len() < total {
            return Err(ProtoError::Truncated {
                needed: total - buf.len(),
            });
        }
        let header = buf[12..12 + header_len].to_vec();
        let body = buf[12 + header_len..12 + header_len + body_len].to_vec();
        let tail_at = 12 + header_len + body_len;
        let tail = u32::from_be_bytes([
            buf[tail_at],
            buf[tail_at + 1],
            buf[tail_at + 2],
            buf[tail_at + 3],
        ]);
        if tail != TAIL_MAGIC {
            return Err(ProtoError::BadMagic(tail));
        }
        Ok(Frame {
            opcode,
            header,
            body,
        })
    }
}

/// Reads one complete frame from an async byte stream.
///
/// Length fields are validated before any payload allocation so a hostile
/// peer cannot ask the server to reserve unbounded memory.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, ProtoError>
where
    R: AsyncRead + Unpin,
{
    let head = reader.read_u32().await?;
    if head != HEAD_MAGIC {
        return Err(ProtoError::BadMagic(head));
    }
    let opcode = reader.read_u16().await?;
    let header_len = reader.read_u16().await? as usize;
    let body_len = reader.read_u32().await? as usize;
    if header_len > MAX_HEADER_LEN || body_len > MAX_BODY_LEN {
        return Err(ProtoError::Oversized {
            header: header_len,
            body: body_len,
        });
    }
    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header).await?;
    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body).await?;
    let tail = reader.read_u32().await?;
    if tail != TAIL_MAGIC {
        return Err(ProtoError::BadMagic(tail));
    }
    Ok(Frame {
        opcode,
        header,
        body,
    })
}

/// Writes one frame to an async byte stream and flushes it.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), ProtoError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&frame.encode()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trip() {
        let frame = Frame {
            opcode: 131,
            header: vec![1, 2, 3],
            body: vec![9, 8, 7, 6],
        };
        let encoded = frame.encode();
        let decoded = Frame::decode(&encoded).expect("decode");
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_rejects_bad_head_magic() {
        let mut encoded = Frame::new(1, vec![0xaa]).encode();
        encoded[0] = 0xff;
        assert!(matches!(
            Frame::decode(&encoded),
            Err(ProtoError::BadMagic(_))
        ));
    }

    #[test]
    fn decode_rejects_bad_tail_magic() {
        let mut encoded = Frame::new(1, vec![0xaa]).encode();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xff;
        assert!(matches!(
            Frame::decode(&encoded),
            Err(ProtoError::BadMagic(_))
        ));
    }

    #[test]
    fn decode_rejects_truncated_buffer() {
        let encoded = Frame::new(7, vec![1, 2, 3, 4]).encode();
        assert!(matches!(
            Frame::decode(&encoded[..encoded.len() - 2]),
            Err(ProtoError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_rejects_oversized_lengths() {
        let mut encoded = Frame::new(7, vec![]).encode();
        // Forge a body length beyond MAX_BODY_LEN.
        encoded[8..12].copy_from_slice(&(MAX_BODY_LEN as u32 + 1).to_be_bytes());
        assert!(matches!(
            Frame::decode(&encoded),
            Err(ProtoError::Oversized { .. })
        ));
    }

    #[tokio::test]
    async fn async_round_trip() {
        let frame = Frame {
            opcode: 42,
            header: vec![],
            body: b"hello".to_vec(),
        };
        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).await.expect("write");
        let mut cursor = std::io::Cursor::new(buf);
        let decoded = read_frame(&mut cursor).await.expect("read");
        assert_eq!(decoded, frame);
    }

    #[tokio::test]
    async fn async_read_eof_is_detectable() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        let err = read_frame(&mut cursor).await.expect_err("eof");
        assert!(err.is_eof());
    }
}
