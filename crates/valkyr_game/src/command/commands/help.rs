//! `/help` — list registered commands.

use crate::command::{CommandArg, CommandDescriptor, CommandFuture};
use crate::context::ServerContext;

pub static HELP: CommandDescriptor = CommandDescriptor {
    name: "help",
    aliases: &["h"],
    permissions: &[],
    desc_key: "help.desc",
    usage_key: "help.usage",
    run: Some(run_help),
    subcommands: &[],
};

fn run_help<'a>(ctx: &'a ServerContext, arg: &'a CommandArg) -> CommandFuture<'a> {
    Box::pin(async move {
        for desc in ctx.commands.descriptors() {
            let aliases = desc.aliases.join(", ");
            arg.send_msg(&ctx.i18n.translate_args(
                "help.entry",
                &[desc.name, &aliases, &ctx.i18n.translate(desc.desc_key)],
            ));
        }
        Ok(())
    })
}
