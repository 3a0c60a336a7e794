//! Session and connection management.
//!
//! A [`Session`] owns one client's outbound frame queue and its
//! optionally-attached [`Player`]. The [`SessionManager`] tracks live
//! sessions and the uid → session binding used for online-target lookup.

pub mod manager;

pub use manager::SessionManager;

use crate::player::Player;
use std::net::SocketAddr;
use std::time::SystemTime;
use tokio::sync::{mpsc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use valkyr_proto::packets::{ChatMsgRsp, NullRsp};
use valkyr_proto::{cmd, Frame, Wire};

/// Chat channel used for server → player text replies.
pub const SYSTEM_CHANNEL: u32 = 0;

/// One client connection.
///
/// The player slot starts empty and is written in exactly two places: the
/// login handler attaches, and session removal on disconnect drops the
/// whole session (and with it the player). Handlers and commands share the
/// player through the session's lock but never move it out.
#[derive(Debug)]
pub struct Session {
    /// Monotonic id assigned at accept time.
    pub id: u64,
    /// Remote network address of the client.
    pub remote_addr: SocketAddr,
    /// When this connection was established.
    pub connected_at: SystemTime,
    outbound: mpsc::UnboundedSender<Frame>,
    player: RwLock<Option<Player>>,
}

impl Session {
    pub fn new(id: u64, remote_addr: SocketAddr, outbound: mpsc::UnboundedSender<Frame>) -> Self {
        Self {
            id,
            remote_addr,
            connected_at: SystemTime::now(),
            outbound,
            player: RwLock::new(None),
        }
    }

    /// Queues a typed packet on the outbound channel.
    ///
    /// A send failure means the writer task already stopped (client went
    /// away); that is a disconnect, not an error worth propagating.
    pub fn send_packet<P: Wire>(&self, opcode: u16, payload: &P) {
        self.send_frame(Frame::new(opcode, payload.encode()));
    }

    /// Queues the canonical empty success response for `rsp_opcode`.
    pub fn send_null_rsp(&self, rsp_opcode: u16) {
        self.send_packet(rsp_opcode, &NullRsp::default());
    }

    /// Queues an empty response carrying a non-zero retcode.
    pub fn send_retcode(&self, rsp_opcode: u16, retcode: u32) {
        self.send_packet(rsp_opcode, &NullRsp { retcode });
    }

    /// Queues a system-channel text message (command replies, notices).
    pub fn send_text(&self, text: &str) {
        self.send_packet(
            cmd::CHAT_MSG_RSP,
            &ChatMsgRsp {
                channel: SYSTEM_CHANNEL,
                sender_uid: 0,
                text: text.to_string(),
            },
        );
    }

    fn send_frame(&self, frame: Frame) {
        if self.outbound.send(frame).is_err() {
            debug!(session = self.id, "dropping outbound frame for closed session");
        }
    }

    /// Read access to the attached player, if any.
    pub async fn player(&self) -> RwLockReadGuard<'_, Option<Player>> {
        self.player.read().await
    }

    /// Write access to the attached player slot.
    ///
    /// Only the login handler may use this to go from `None` to `Some`.
    pub async fn player_mut(&self) -> RwLockWriteGuard<'_, Option<Player>> {
        self.player.write().await
    }

    /// Uid of the attached player, or `None` pre-authentication.
    pub async fn uid(&self) -> Option<u64> {
        self.player.read().await.as_ref().map(|p| p.uid)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::session_with_channel;
    use super::*;

    #[tokio::test]
    async fn null_rsp_carries_success_retcode() {
        let (session, mut rx) = session_with_channel(1);
        session.send_null_rsp(cmd::SET_SELF_DESC_RSP);
        let frame = rx.recv().await.expect("frame");
        assert_eq!(frame.opcode, cmd::SET_SELF_DESC_RSP);
        assert_eq!(NullRsp::decode(&frame.body).unwrap().retcode, 0);
    }

    #[tokio::test]
    async fn send_after_writer_gone_does_not_panic() {
        let (session, rx) = session_with_channel(2);
        drop(rx);
        session.send_text("anyone there?");
    }
}
