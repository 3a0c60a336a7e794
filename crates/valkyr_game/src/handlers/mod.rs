//! Packet handler registrations.
//!
//! Every request opcode this server understands is listed here, once, in
//! [`build_dispatch_table`]. Registration is explicit rather than scanned:
//! the list is the audit surface, and a duplicate entry fails startup.

pub mod chat;
pub mod ping;
pub mod player;

use crate::dispatch::{DispatchTable, PacketHandler};
use crate::error::ServerError;
use std::sync::Arc;
use valkyr_proto::cmd;

/// Builds the process-wide dispatch table from the static handler list.
pub fn build_dispatch_table() -> Result<DispatchTable, ServerError> {
    let entries: Vec<(u16, Arc<dyn PacketHandler>)> = vec![
        (cmd::PING_REQ, Arc::new(ping::PingHandler)),
        (cmd::PLAYER_LOGIN_REQ, Arc::new(player::LoginHandler)),
        (cmd::GET_MAIN_DATA_REQ, Arc::new(player::GetMainDataHandler)),
        (cmd::SET_SELF_DESC_REQ, Arc::new(player::SetSelfDescHandler)),
        (
            cmd::SET_CUSTOM_HEAD_REQ,
            Arc::new(player::SetCustomHeadHandler),
        ),
        (
            cmd::UPDATE_ASSISTANT_AVATAR_ID_REQ,
            Arc::new(player::UpdateAssistantAvatarIdHandler),
        ),
        (cmd::MEDAL_OP_REQ, Arc::new(player::MedalOpHandler)),
        (cmd::CHAT_MSG_REQ, Arc::new(chat::ChatMsgHandler)),
    ];

    let mut table = DispatchTable::new();
    for (opcode, handler) in entries {
        table.register(opcode, handler)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_builds_with_all_registrations() {
        let table = build_dispatch_table().expect("dispatch table");
        assert_eq!(table.handler_count(), 8);
    }
}
