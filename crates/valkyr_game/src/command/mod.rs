//! Declarative text-command framework.
//!
//! Commands are described by static [`CommandDescriptor`] metadata — name,
//! aliases, required permissions, i18n keys, sub-command table — and a
//! registry built once at startup maps every name and alias to its
//! descriptor. Execution is a fixed pipeline: tokenize, resolve, permission
//! check (fail closed), sub-command resolve, bind arguments, invoke. Every
//! failure on that path is answered with a localized message; commands
//! never fail silently and never crash the session.

pub mod arg;
pub mod commands;

pub use arg::CommandArg;

use crate::context::ServerContext;
use crate::error::ServerError;
use crate::player::Permission;
use crate::session::Session;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Future returned by a command method.
pub type CommandFuture<'a> = BoxFuture<'a, Result<(), ServerError>>;

/// A command or sub-command method.
pub type CommandFn = for<'a> fn(&'a ServerContext, &'a CommandArg) -> CommandFuture<'a>;

/// Binds a sub-command literal to its method.
pub struct SubCommand {
    pub literal: &'static str,
    pub run: CommandFn,
}

/// Declarative metadata for one command.
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Permissions the invoker must hold, all of them. Empty means open.
    pub permissions: &'static [Permission],
    pub desc_key: &'static str,
    pub usage_key: &'static str,
    /// Method invoked when the command has no sub-commands.
    pub run: Option<CommandFn>,
    /// Ordered sub-command table; non-empty takes precedence over `run`.
    pub subcommands: &'static [SubCommand],
}

/// All registered commands, in registration order.
static COMMANDS: &[&CommandDescriptor] = &[&commands::give::GIVE, &commands::help::HELP];

/// Name/alias → descriptor registry, immutable after startup.
pub struct CommandRegistry {
    descriptors: Vec<&'static CommandDescriptor>,
    index: HashMap<&'static str, usize>,
}

/// Builds the registry from the static command list.
///
/// A name or alias registered twice is a startup-fatal configuration
/// error, mirroring the opcode dispatch table.
pub fn build_command_registry() -> Result<CommandRegistry, ServerError> {
    let mut descriptors = Vec::new();
    let mut index = HashMap::new();
    for desc in COMMANDS {
        let idx = descriptors.len();
        descriptors.push(*desc);
        if index.insert(desc.name, idx).is_some() {
            return Err(ServerError::Config(format!(
                "duplicate command name: {}",
                desc.name
            )));
        }
        for alias in desc.aliases {
            if index.insert(*alias, idx).is_some() {
                return Err(ServerError::Config(format!(
                    "duplicate command alias: {alias}"
                )));
            }
        }
    }
    Ok(CommandRegistry { descriptors, index })
}

impl CommandRegistry {
    pub fn descriptors(&self) -> &[&'static CommandDescriptor] {
        &self.descriptors
    }

    /// Exact-match resolution on registered names and aliases.
    pub fn resolve(&self, name: &str) -> Option<&'static CommandDescriptor> {
        self.index.get(name).map(|&i| self.descriptors[i])
    }

    /// Runs one command invocation end to end.
    ///
    /// All outcomes, including every error case, are reported to the
    /// invoker as localized chat text.
    pub async fn execute(&self, ctx: &ServerContext, invoker: &Arc<Session>, raw: &str) {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let Some(&name) = tokens.first() else {
            return;
        };

        let Some(desc) = self.resolve(name) else {
            invoker.send_text(&ctx.i18n.translate_args("command.unknown", &[name]));
            return;
        };

        // Fail closed: permission check happens before anything else can
        // touch game state.
        let permitted = match invoker.player().await.as_ref() {
            Some(player) => player.has_permissions(desc.permissions),
            None => false,
        };
        if !permitted {
            let key = if invoker.player().await.is_some() {
                "command.no_permission"
            } else {
                "command.not_logged_in"
            };
            invoker.send_text(&ctx.i18n.translate(key));
            return;
        }

        let mut rest: &[&str] = &tokens[1..];
        let run: CommandFn = if desc.subcommands.is_empty() {
            match desc.run {
                Some(f) => f,
                None => {
                    invoker.send_text(&ctx.i18n.translate(desc.usage_key));
                    return;
                }
            }
        } else {
            let resolved = rest
                .first()
                .and_then(|lit| desc.subcommands.iter().find(|s| s.literal == *lit));
            match resolved {
                Some(sub) => {
                    rest = &rest[1..];
                    sub.run
                }
                None => {
                    invoker.send_text(&ctx.i18n.translate(desc.usage_key));
                    return;
                }
            }
        };

        // Bind positional arguments and resolve the explicit target, if
        // any. An offline target aborts before the method runs.
        let mut positional = Vec::new();
        let mut mention: Option<&str> = None;
        for tok in rest {
            match tok.strip_prefix('@') {
                Some(m) => mention = Some(m),
                None => positional.push(tok.to_string()),
            }
        }
        let target = match mention {
            Some(m) => {
                let resolved = m.parse::<u64>().ok().and_then(|uid| ctx.sessions.find_by_uid(uid));
                match resolved {
                    Some(s) => s,
                    None => {
                        invoker
                            .send_text(&ctx.i18n.translate_args("command.target_offline", &[m]));
                        return;
                    }
                }
            }
            None => invoker.clone(),
        };

        let arg = CommandArg::new(invoker.clone(), target, positional);
        if let Err(e) = run(ctx, &arg).await {
            warn!(command = desc.name, "command failed: {e}");
        }
    }
}
