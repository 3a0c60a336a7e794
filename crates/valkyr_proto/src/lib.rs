//! # Valkyr Wire Protocol
//!
//! Framing and payload codec for the binary session protocol spoken between
//! the game client and the game server. Every message on the wire is a
//! length-framed packet carrying a numeric opcode, an opaque packet header,
//! and a body payload encoded with the [`Wire`] schema format.
//!
//! ## Frame Layout
//!
//! All frame-level integers are big-endian:
//!
//! ```text
//! u32  HEAD_MAGIC (0x01234567)
//! u16  opcode
//! u16  header length
//! u32  body length
//! ...  header bytes
//! ...  body bytes
//! u32  TAIL_MAGIC (0x89abcdef)
//! ```
//!
//! The codec never panics on malformed input: bad magic values, truncated
//! buffers, and oversized length fields all surface as [`ProtoError`].
//!
//! ## Payload Format
//!
//! Body payloads use a simple schema-defined record encoding: fixed-width
//! little-endian integers and `u16`-length-prefixed UTF-8 strings, in field
//! declaration order. The [`Wire`] trait is the codec boundary the dispatch
//! layer programs against.

pub mod cmd;
pub mod error;
pub mod frame;
pub mod packets;
pub mod wire;

pub use error::ProtoError;
pub use frame::{read_frame, write_frame, Frame, HEAD_MAGIC, TAIL_MAGIC};
pub use wire::{Wire, WireReader, WireWriter};
