//! Game server configuration.

use std::net::SocketAddr;

/// Runtime configuration for the game server.
///
/// Assembled by the binary crate from its TOML application config; the game
/// server itself never touches the filesystem for configuration.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Address the TCP listener binds to.
    pub bind_address: SocketAddr,
    /// Account uids granted the admin permission at login.
    pub admin_uids: Vec<u64>,
    /// Account uids granted the support permission at login.
    pub support_uids: Vec<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 16100)),
            admin_uids: Vec::new(),
            support_uids: Vec::new(),
        }
    }
}
