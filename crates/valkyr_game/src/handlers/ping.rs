//! Keepalive handler.

use crate::context::ServerContext;
use crate::dispatch::PacketHandler;
use crate::error::ServerError;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use valkyr_proto::packets::{PingReq, PingRsp};
use valkyr_proto::{cmd, Wire};

pub struct PingHandler;

#[async_trait]
impl PacketHandler for PingHandler {
    async fn handle(
        &self,
        _ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        let req = PingReq::decode(body)?;
        let server_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        session.send_packet(
            cmd::PING_RSP,
            &PingRsp {
                client_time: req.client_time,
                server_time,
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

    #[tokio::test]
    async fn ping_echoes_client_time() {
        let ctx = test_context();
        let (session, mut rx) = session_with_channel(1);
        PingHandler
            .handle(&ctx, &session, &[], &PingReq { client_time: 777 }.encode())
            .await
            .expect("handle");
        let frame = rx.recv().await.expect("frame");
        assert_eq!(frame.opcode, cmd::PING_RSP);
        assert_eq!(PingRsp::decode(&frame.body).unwrap().client_time, 777);
    }
}
