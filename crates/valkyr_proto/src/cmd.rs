//! Opcode constants for the session protocol.
//!
//! Request and response opcodes share one numeric space but travel in
//! opposite directions; by convention a response opcode is its request
//! opcode plus one. Only request opcodes are registered in the dispatch
//! table.

pub const PING_REQ: u16 = 1;
pub const PING_RSP: u16 = 2;

pub const PLAYER_LOGIN_REQ: u16 = 101;
pub const PLAYER_LOGIN_RSP: u16 = 102;

pub const GET_MAIN_DATA_REQ: u16 = 111;
pub const GET_MAIN_DATA_RSP: u16 = 112;

pub const SET_SELF_DESC_REQ: u16 = 131;
pub const SET_SELF_DESC_RSP: u16 = 132;

pub const SET_CUSTOM_HEAD_REQ: u16 = 133;
pub const SET_CUSTOM_HEAD_RSP: u16 = 134;

pub const UPDATE_ASSISTANT_AVATAR_ID_REQ: u16 = 135;
pub const UPDATE_ASSISTANT_AVATAR_ID_RSP: u16 = 136;

pub const MEDAL_OP_REQ: u16 = 137;
pub const MEDAL_OP_RSP: u16 = 138;

pub const CHAT_MSG_REQ: u16 = 141;
pub const CHAT_MSG_RSP: u16 = 142;
