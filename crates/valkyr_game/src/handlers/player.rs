//! Player profile handlers.
//!
//! Profile mutations follow one pattern: guard on an attached player,
//! apply the field change, re-send the main-data snapshot so the client
//! view converges, then acknowledge with the canonical empty response.

use crate::context::ServerContext;
use crate::dispatch::PacketHandler;
use crate::error::ServerError;
use crate::player::Player;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use valkyr_proto::packets::{
    GetMainDataReq, MedalOpReq, PlayerLoginReq, PlayerLoginRsp, SetCustomHeadReq, SetSelfDescReq,
    UpdateAssistantAvatarIdReq,
};
use valkyr_proto::{cmd, Wire};

/// Retcode sent when a player-gated packet arrives before login.
const RETCODE_NOT_LOGGED_IN: u32 = 1;

/// Attaches the player to the session. This is the single mutation point
/// that takes the player slot from `None` to `Some`; nothing else writes
/// it until disconnect drops the session.
pub struct LoginHandler;

#[async_trait]
impl PacketHandler for LoginHandler {
    async fn handle(
        &self,
        ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        let req = PlayerLoginReq::decode(body)?;

        let mut guard = session.player_mut().await;
        if let Some(existing) = guard.as_ref() {
            warn!(
                session = session.id,
                uid = existing.uid,
                "duplicate login request, resending response"
            );
            let rsp = PlayerLoginRsp {
                retcode: 0,
                uid: existing.uid,
                nickname: existing.nickname.clone(),
            };
            drop(guard);
            session.send_packet(cmd::PLAYER_LOGIN_RSP, &rsp);
            return Ok(());
        }

        let account = ctx.accounts.authenticate(req.uid, &req.token);
        let player = Player::new(account.uid, account.nickname, account.permissions);
        let rsp = PlayerLoginRsp {
            retcode: 0,
            uid: player.uid,
            nickname: player.nickname.clone(),
        };
        *guard = Some(player);
        drop(guard);

        ctx.sessions.bind_uid(req.uid, session.id);
        info!("👋 Player {} logged in from {}", req.uid, session.remote_addr);
        session.send_packet(cmd::PLAYER_LOGIN_RSP, &rsp);
        Ok(())
    }
}

pub struct GetMainDataHandler;

#[async_trait]
impl PacketHandler for GetMainDataHandler {
    async fn handle(
        &self,
        _ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        GetMainDataReq::decode(body)?;
        let guard = session.player().await;
        let Some(player) = guard.as_ref() else {
            warn!(session = session.id, "main data request before login");
            session.send_retcode(cmd::GET_MAIN_DATA_RSP, RETCODE_NOT_LOGGED_IN);
            return Ok(());
        };
        let main = player.main_data();
        drop(guard);
        session.send_packet(cmd::GET_MAIN_DATA_RSP, &main);
        Ok(())
    }
}

pub struct SetSelfDescHandler;

#[async_trait]
impl PacketHandler for SetSelfDescHandler {
    async fn handle(
        &self,
        _ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        let req = SetSelfDescReq::decode(body)?;
        let mut guard = session.player_mut().await;
        let Some(player) = guard.as_mut() else {
            warn!(session = session.id, "set-self-desc before login");
            session.send_retcode(cmd::SET_SELF_DESC_RSP, RETCODE_NOT_LOGGED_IN);
            return Ok(());
        };
        player.signature = req.self_desc;
        let main = player.main_data();
        drop(guard);
        session.send_packet(cmd::GET_MAIN_DATA_RSP, &main);
        session.send_null_rsp(cmd::SET_SELF_DESC_RSP);
        Ok(())
    }
}

pub struct SetCustomHeadHandler;

#[async_trait]
impl PacketHandler for SetCustomHeadHandler {
    async fn handle(
        &self,
        _ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        let req = SetCustomHeadReq::decode(body)?;
        let mut guard = session.player_mut().await;
        let Some(player) = guard.as_mut() else {
            warn!(session = session.id, "set-custom-head before login");
            session.send_retcode(cmd::SET_CUSTOM_HEAD_RSP, RETCODE_NOT_LOGGED_IN);
            return Ok(());
        };
        player.head_icon = req.id;
        let main = player.main_data();
        drop(guard);
        session.send_packet(cmd::GET_MAIN_DATA_RSP, &main);
        session.send_null_rsp(cmd::SET_CUSTOM_HEAD_RSP);
        Ok(())
    }
}

pub struct UpdateAssistantAvatarIdHandler;

#[async_trait]
impl PacketHandler for UpdateAssistantAvatarIdHandler {
    async fn handle(
        &self,
        _ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        let req = UpdateAssistantAvatarIdReq::decode(body)?;
        let mut guard = session.player_mut().await;
        let Some(player) = guard.as_mut() else {
            warn!(session = session.id, "assistant-avatar update before login");
            session.send_retcode(cmd::UPDATE_ASSISTANT_AVATAR_ID_RSP, RETCODE_NOT_LOGGED_IN);
            return Ok(());
        };
        player.assistant_avatar_id = req.avatar_id;
        let main = player.main_data();
        drop(guard);
        session.send_packet(cmd::GET_MAIN_DATA_RSP, &main);
        session.send_null_rsp(cmd::UPDATE_ASSISTANT_AVATAR_ID_RSP);
        Ok(())
    }
}

/// Intentional stub: the mapping between the medal-op wire fields and
/// player state is unresolved upstream, so the server acknowledges with
/// the canonical empty response and changes nothing. Clients treat the
/// empty response as success and do not stall.
pub struct MedalOpHandler;

#[async_trait]
impl PacketHandler for MedalOpHandler {
    async fn handle(
        &self,
        _ctx: &ServerContext,
        session: &Arc<Session>,
        _header: &[u8],
        body: &[u8],
    ) -> Result<(), ServerError> {
        let req = MedalOpReq::decode(body)?;
        warn!(
            session = session.id,
            op_type = req.op_type,
            medal_id = req.medal_id,
            "MedalOpReq not implemented"
        );
        session.send_null_rsp(cmd::MEDAL_OP_RSP);
        Ok(())
    }
}
