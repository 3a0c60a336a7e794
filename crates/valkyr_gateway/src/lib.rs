//! Versioned dispatch gateway for game clients.
//!
//! Clients hit a single HTTP endpoint with their full version string
//! (for example `1_os_3.9`). The gateway resolves a hotfix manifest for
//! that version — from the local cache when possible, otherwise by
//! fetching the official upstream response, decrypting it and caching
//! the extracted manifest — then builds a dispatch document pointing the
//! client at this server and returns it encrypted with the per-version
//! AES key.

pub mod cipher;
pub mod error;
pub mod fetch;
pub mod hotfix;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod urls;
pub mod version;

pub use cipher::DispatchCipher;
pub use error::GatewayError;
pub use fetch::{HttpManifestFetcher, ManifestFetcher};
pub use hotfix::HotfixStore;
pub use resolver::{DispatchQuery, HotfixResolver};
pub use response::GatewayConfig;
pub use routes::{router, GatewayState};
