//! Error types for the game server.

use thiserror::Error;
use valkyr_proto::ProtoError;

/// Categorized failures across the game server.
///
/// Only `Config` errors abort the process, and only at startup; everything
/// else is handled per-message or per-connection.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("player error: {0}")]
    Player(String),

    #[error("internal error: {0}")]
    Internal(String),
}
