//! Gateway error types.

use thiserror::Error;

/// Errors raised while resolving or serving a dispatch response.
///
/// The HTTP layer collapses all of these into a generic client error so
/// that internal details never leak to game clients; the variants exist
/// for logging and for tests. `Clone` lets every requester sharing one
/// in-flight manifest fill observe its outcome.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The requested version has no configured AES key.
    #[error("unsupported game version: {0}")]
    UnsupportedVersion(String),

    /// The version string names a region the gateway does not know.
    #[error("unsupported region: {0}")]
    UnsupportedRegion(String),

    /// The upstream dispatch server could not be reached or answered
    /// with a non-success status.
    #[error("upstream fetch failed: {0}")]
    Fetch(String),

    /// An upstream payload failed to decrypt with the configured key.
    #[error("failed to decrypt dispatch payload for version {0}")]
    Decrypt(u32),

    /// The decrypted upstream payload was not the expected document.
    #[error("malformed dispatch manifest: {0}")]
    Manifest(String),

    /// The hotfix cache file could not be read or written.
    #[error("hotfix persistence error: {0}")]
    Persist(String),

    /// Invalid gateway configuration, such as a malformed AES key.
    #[error("gateway configuration error: {0}")]
    Config(String),

    /// Unexpected internal failure.
    #[error("internal gateway error: {0}")]
    Internal(String),
}
