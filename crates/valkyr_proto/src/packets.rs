//! Typed payload records for every modeled opcode.
//!
//! Each record implements [`Wire`] with fields encoded in declaration
//! order. `NullRsp` is the protocol's canonical empty acknowledgement: a
//! bare retcode, where zero means success. Handlers that acknowledge
//! without carrying data reply with it so clients never stall waiting for
//! a response.

use crate::error::ProtoError;
use crate::wire::{Wire, WireReader, WireWriter};

/// Canonical empty response: retcode only, `0` = success.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NullRsp {
    pub retcode: u32,
}

impl Wire for NullRsp {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.retcode);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            retcode: r.get_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLoginReq {
    pub uid: u64,
    pub token: String,
}

impl Wire for PlayerLoginReq {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u64(self.uid);
        w.put_string(&self.token);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            uid: r.get_u64()?,
            token: r.get_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLoginRsp {
    pub retcode: u32,
    pub uid: u64,
    pub nickname: String,
}

impl Wire for PlayerLoginRsp {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.retcode);
        w.put_u64(self.uid);
        w.put_string(&self.nickname);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            retcode: r.get_u32()?,
            uid: r.get_u64()?,
            nickname: r.get_string()?,
        })
    }
}

/// Empty-bodied request; carries no fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetMainDataReq;

impl Wire for GetMainDataReq {
    fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    fn decode(_buf: &[u8]) -> Result<Self, ProtoError> {
        Ok(Self)
    }
}

/// Snapshot of the player's main profile, re-sent after any profile
/// mutation so the client view converges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMainDataRsp {
    pub uid: u64,
    pub nickname: String,
    pub level: u32,
    pub head_icon: u32,
    pub signature: String,
    pub assistant_avatar_id: u32,
}

impl Wire for GetMainDataRsp {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u64(self.uid);
        w.put_string(&self.nickname);
        w.put_u32(self.level);
        w.put_u32(self.head_icon);
        w.put_string(&self.signature);
        w.put_u32(self.assistant_avatar_id);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            uid: r.get_u64()?,
            nickname: r.get_string()?,
            level: r.get_u32()?,
            head_icon: r.get_u32()?,
            signature: r.get_string()?,
            assistant_avatar_id: r.get_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSelfDescReq {
    pub self_desc: String,
}

impl Wire for SetSelfDescReq {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_string(&self.self_desc);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            self_desc: r.get_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCustomHeadReq {
    pub id: u32,
}

impl Wire for SetCustomHeadReq {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.id);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self { id: r.get_u32()? })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAssistantAvatarIdReq {
    pub avatar_id: u32,
}

impl Wire for UpdateAssistantAvatarIdReq {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.avatar_id);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            avatar_id: r.get_u32()?,
        })
    }
}

/// Medal operation request. The mapping between `op_type` and player
/// state is unresolved upstream; the server acknowledges without acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedalOpReq {
    pub op_type: u32,
    pub medal_id: u32,
}

impl Wire for MedalOpReq {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.op_type);
        w.put_u32(self.medal_id);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            op_type: r.get_u32()?,
            medal_id: r.get_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMsgReq {
    pub channel: u32,
    pub text: String,
}

impl Wire for ChatMsgReq {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.channel);
        w.put_string(&self.text);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            channel: r.get_u32()?,
            text: r.get_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMsgRsp {
    pub channel: u32,
    pub sender_uid: u64,
    pub text: String,
}

impl Wire for ChatMsgRsp {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.channel);
        w.put_u64(self.sender_uid);
        w.put_string(&self.text);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            channel: r.get_u32()?,
            sender_uid: r.get_u64()?,
            text: r.get_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingReq {
    pub client_time: u32,
}

impl Wire for PingReq {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.client_time);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            client_time: r.get_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingRsp {
    pub client_time: u32,
    pub server_time: u64,
}

impl Wire for PingRsp {
    fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        w.put_u32(self.client_time);
        w.put_u64(self.server_time);
        w.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self, ProtoError> {
        let mut r = WireReader::new(buf);
        Ok(Self {
            client_time: r.get_u32()?,
            server_time: r.get_u64()?,
        })
    }
}
