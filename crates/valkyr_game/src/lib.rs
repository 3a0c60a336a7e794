//! # Valkyr Game Server
//!
//! Persistent-connection game server for the Valkyr protocol. Each client
//! speaks length-framed, opcode-tagged binary messages over one long-lived
//! TCP connection; the server routes every inbound packet to exactly one
//! registered handler and processes a connection's messages strictly in
//! arrival order.
//!
//! ## Architecture
//!
//! * **Session layer** — one [`session::Session`] per connection, owning the
//!   outbound frame queue and the optionally-attached [`player::Player`].
//! * **Dispatch table** — process-wide opcode → handler registry, built once
//!   at startup from an explicit list and read-only afterwards.
//! * **Command framework** — declarative text-command registry with
//!   permission gating and sub-command resolution, reachable through the
//!   chat channel.
//! * **Boundaries** — static design data ([`data`]), localization
//!   ([`i18n`]), and the account store ([`accounts`]) are thin lookup
//!   collaborators with no protocol logic of their own.
//!
//! ## Message Flow
//!
//! 1. The accept loop spawns one task per connection.
//! 2. The read loop decodes a frame and hands it to the dispatch table.
//! 3. The handler decodes the body into its typed record and mutates
//!    session/player state.
//! 4. Responses are queued on the session's outbound channel; a writer task
//!    drains the queue to the socket.
//!
//! Unknown opcodes and malformed payloads are logged and dropped — a client
//! on a mismatched version must never crash the server.

pub mod accounts;
pub mod command;
pub mod config;
pub mod context;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod player;
pub mod server;
pub mod session;

pub use accounts::AccountStore;
pub use config::GameConfig;
pub use context::ServerContext;
pub use data::GameData;
pub use error::ServerError;
pub use i18n::I18n;
pub use server::GameServer;
