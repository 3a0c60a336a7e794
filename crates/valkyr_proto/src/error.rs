//! Error types for the wire protocol codec.

use thiserror::Error;

/// Errors produced while framing or decoding protocol messages.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Underlying transport failure while reading or writing a frame.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame did not start with `HEAD_MAGIC` or end with `TAIL_MAGIC`.
    #[error("bad frame magic: {0:#010x}")]
    BadMagic(u32),

    /// A length field exceeded the codec's hard limits.
    #[error("frame length out of bounds: header {header} body {body}")]
    Oversized { header: usize, body: usize },

    /// Buffer ended before the declared frame or field length.
    #[error("truncated input: needed {needed} more bytes")]
    Truncated { needed: usize },

    /// A string field was not valid UTF-8.
    #[error("invalid utf-8 in string field")]
    InvalidString,

    /// Payload bytes did not match the expected record schema.
    #[error("malformed payload for opcode {opcode}: {reason}")]
    MalformedPayload { opcode: u16, reason: String },
}

impl ProtoError {
    /// True when the error came from the transport reaching end-of-stream,
    /// which the session layer treats as a normal disconnect.
    pub fn is_eof(&self) -> bool {
        matches!(
            self,
            ProtoError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof
        )
    }
}
