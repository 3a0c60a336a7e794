//! Chat handler: operator commands ride the same channel as player chat.

use crate::context::ServerContext;
use crate::dispatch::PacketHandler;
use crate::error::ServerError;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use valkyr_proto::packets::{ChatMsgReq, ChatMsgRsp};
use valkyr_proto::{cmd, Wire};

/// Routes chat text: a leading `/` enters the command executor, anything
/// else is echoed back to the sender (world chat is outside this core).
pub struct ChatMsgHandler;

#[async_trait]
impl PacketHandler for ChatMsgHandler {
    async fn handle(
        &self,
        ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        let req = ChatMsgReq::decode(body)?;
        let Some(uid) = session.uid().await else {
            warn!(session = session.id, "chat before login, dropping");
            return Ok(());
        };

        if let Some(command_line) = req.text.strip_prefix('/') {
            ctx.commands.execute(ctx, session, command_line).await;
            return Ok(());
        }

        session.send_packet(
            cmd::CHAT_MSG_RSP,
            &ChatMsgRsp {
                channel: req.channel,
                sender_uid: uid,
                text: req.text,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::test_context;
    use crate::session::test_support::session_with_channel;
    use crate::handlers::player::LoginHandler;
    use valkyr_proto::packets::PlayerLoginReq;

    #[tokio::test]
    async fn plain_chat_is_echoed_to_sender() {
        let ctx = test_context();
        let (session, mut rx) = session_with_channel(1);
        LoginHandler
            .handle(
                &ctx,
                &session,
                &[],
                &PlayerLoginReq {
                    uid: 5,
                    token: "t".into(),
                }
                .encode(),
            )
            .await
            .expect("login");
        rx.recv().await.expect("login rsp");

        ChatMsgHandler
            .handle(
                &ctx,
                &session,
                &[],
                &ChatMsgReq {
                    channel: 1,
                    text: "hello".into(),
                }
                .encode(),
            )
            .await
            .expect("handle");

        let frame = rx.recv().await.expect("echo");
        assert_eq!(frame.opcode, cmd::CHAT_MSG_RSP);
        let rsp = ChatMsgRsp::decode(&frame.body).unwrap();
        assert_eq!(rsp.sender_uid, 5);
        assert_eq!(rsp.text, "hello");
    }

    #[tokio::test]
    async fn pre_login_chat_is_dropped() {
        let ctx = test_context();
        let (session, mut rx) = session_with_channel(2);
        ChatMsgHandler
            .handle(
                &ctx,
                &session,
                &[],
                &ChatMsgReq {
                    channel: 1,
                    text: "/give material 201 5".into(),
                }
                .encode(),
            )
            .await
            .expect("handle");
        assert!(rx.try_recv().is_err());
    }
}
