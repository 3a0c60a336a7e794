//! Shared server context handed to packet handlers and commands.

use crate::accounts::AccountStore;
use crate::command::CommandRegistry;
use crate::data::GameData;
use crate::i18n::I18n;
use crate::session::SessionManager;
use std::sync::Arc;

/// Read-mostly state shared by every handler and command invocation.
///
/// Built once at startup; the registries inside are immutable afterwards,
/// so the dispatch hot path takes no locks beyond each session's own
/// player lock.
pub struct ServerContext {
    pub sessions: SessionManager,
    pub data: Arc<GameData>,
    pub i18n: Arc<I18n>,
    pub accounts: AccountStore,
    pub commands: CommandRegistry,
}

impl ServerContext {
    pub fn new(
        data: Arc<GameData>,
        i18n: Arc<I18n>,
        accounts: AccountStore,
        commands: CommandRegistry,
    ) -> Self {
        Self {
            sessions: SessionManager::new(),
            data,
            i18n,
            accounts,
            commands,
        }
    }
}
