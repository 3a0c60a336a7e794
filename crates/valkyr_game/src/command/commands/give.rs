//! `/give` — grant items to an online player.

use crate::command::{CommandArg, CommandDescriptor, CommandFuture, SubCommand};
use crate::context::ServerContext;
use crate::player::Permission;
use tracing::debug;

pub static GIVE: CommandDescriptor = CommandDescriptor {
    name: "give",
    aliases: &["g"],
    permissions: &[Permission::Admin],
    desc_key: "give.desc",
    usage_key: "give.usage",
    run: None,
    subcommands: &[
        SubCommand {
            literal: "material",
            run: give_material,
        },
        SubCommand {
            literal: "fragment",
            run: give_fragment,
        },
    ],
};

/// Reserved soft-currency item id, exempt from the per-item cap.
const CURRENCY_ITEM_ID: u32 = 100;

/// Fixed ceiling applied to the exempt currency item instead of its cap.
const CURRENCY_CEILING: u64 = 99_999_999;

fn give_material<'a>(ctx: &'a ServerContext, arg: &'a CommandArg) -> CommandFuture<'a> {
    Box::pin(async move {
        let item_id = u32::try_from(arg.get_int(0)).unwrap_or(0);
        // Must give at least one.
        let mut quantity = arg.get_int(1).max(1) as u64;

        let Some(item) = ctx.data.material(item_id) else {
            debug!(item_id, "give requested for an item id that does not exist");
            arg.send_msg(&ctx.i18n.translate("give.item_not_exist"));
            return Ok(());
        };

        if item_id == CURRENCY_ITEM_ID {
            // Auditable exemption: currency skips the per-item cap table
            // and uses its own fixed ceiling.
            quantity = quantity.min(CURRENCY_CEILING);
        } else {
            quantity = quantity.min(item.quantity_limit);
            if quantity == 0 {
                arg.send_msg(&ctx.i18n.translate("give.invalid_quantity"));
                return Ok(());
            }
        }

        let mut guard = arg.target.player_mut().await;
        let Some(player) = guard.as_mut() else {
            arg.send_msg(&ctx.i18n.translate_args("command.target_offline", &["target"]));
            return Ok(());
        };
        player.inventory.add_material(item_id, quantity);
        let nickname = player.nickname.clone();
        drop(guard);

        arg.send_msg(&ctx.i18n.translate_args(
            "give.success",
            &[&quantity.to_string(), &item.name, &nickname],
        ));
        Ok(())
    })
}

fn give_fragment<'a>(ctx: &'a ServerContext, arg: &'a CommandArg) -> CommandFuture<'a> {
    Box::pin(async move {
        let fragment_id = u32::try_from(arg.get_int(0)).unwrap_or(0);
        let mut quantity = arg.get_int(1).max(1) as u64;

        let Some(fragment) = ctx.data.fragment(fragment_id) else {
            debug!(fragment_id, "give requested for a fragment id that does not exist");
            arg.send_msg(&ctx.i18n.translate("give.item_not_exist"));
            return Ok(());
        };

        quantity = quantity.min(fragment.quantity_limit);
        if quantity == 0 {
            arg.send_msg(&ctx.i18n.translate("give.invalid_quantity"));
            return Ok(());
        }

        let mut guard = arg.target.player_mut().await;
        let Some(player) = guard.as_mut() else {
            arg.send_msg(&ctx.i18n.translate_args("command.target_offline", &["target"]));
            return Ok(());
        };
        player.inventory.add_fragment(fragment_id, quantity);
        let nickname = player.nickname.clone();
        drop(guard);

        let label = format!("fragment:{}", fragment.id);
        arg.send_msg(&ctx.i18n.translate_args(
            "give.success",
            &[&quantity.to_string(), &label, &nickname],
        ));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::test_context;
    use crate::dispatch::PacketHandler;
    use crate::handlers::player::LoginHandler;
    use crate::session::Session;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;
    use valkyr_proto::packets::{ChatMsgRsp, PlayerLoginReq};
    use valkyr_proto::{cmd, Frame, Wire};

    async fn admin_session(
        ctx: &ServerContext,
    ) -> (Arc<Session>, UnboundedReceiver<Frame>) {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let session = ctx
            .sessions
            .register(std::net::SocketAddr::from(([127, 0, 0, 1], 0)), tx);
        LoginHandler
            .handle(
                ctx,
                &session,
                &[],
                &PlayerLoginReq {
                    uid: 9000,
                    token: "t".into(),
                }
                .encode(),
            )
            .await
            .expect("login");
        rx.recv().await.expect("login rsp");
        (session, rx)
    }

    fn next_text(rx: &mut UnboundedReceiver<Frame>) -> String {
        let frame = rx.try_recv().expect("reply frame");
        assert_eq!(frame.opcode, cmd::CHAT_MSG_RSP);
        ChatMsgRsp::decode(&frame.body).expect("chat rsp").text
    }

    async fn material_count(session: &Arc<Session>, id: u32) -> u64 {
        session
            .player()
            .await
            .as_ref()
            .expect("player")
            .inventory
            .material_count(id)
    }

    #[tokio::test]
    async fn nonpositive_quantity_coerces_to_one() {
        let ctx = test_context();
        let (session, mut rx) = admin_session(&ctx).await;
        ctx.commands
            .execute(&ctx, &session, "give material 201 -3")
            .await;
        assert_eq!(next_text(&mut rx), "Gave 1 x Crystal to Captain9000");
        assert_eq!(material_count(&session, 201).await, 1);
    }

    #[tokio::test]
    async fn missing_quantity_defaults_to_one() {
        let ctx = test_context();
        let (session, mut rx) = admin_session(&ctx).await;
        ctx.commands.execute(&ctx, &session, "give material 201").await;
        assert_eq!(next_text(&mut rx), "Gave 1 x Crystal to Captain9000");
    }

    #[tokio::test]
    async fn quantity_above_cap_clamps_to_exact_cap() {
        let ctx = test_context();
        let (session, mut rx) = admin_session(&ctx).await;
        // Crystal's cap in the test data is 50.
        ctx.commands
            .execute(&ctx, &session, "give material 201 500")
            .await;
        assert_eq!(next_text(&mut rx), "Gave 50 x Crystal to Captain9000");
        assert_eq!(material_count(&session, 201).await, 50);
    }

    #[tokio::test]
    async fn currency_item_bypasses_cap_up_to_its_ceiling() {
        let ctx = test_context();
        let (session, mut rx) = admin_session(&ctx).await;
        // Coin's configured cap is 9 999, but id 100 is exempt.
        ctx.commands
            .execute(&ctx, &session, "give material 100 123456789")
            .await;
        assert_eq!(
            next_text(&mut rx),
            format!("Gave {CURRENCY_CEILING} x Coin to Captain9000")
        );
        assert_eq!(material_count(&session, 100).await, CURRENCY_CEILING);
    }

    #[tokio::test]
    async fn unknown_item_is_reported() {
        let ctx = test_context();
        let (session, mut rx) = admin_session(&ctx).await;
        ctx.commands
            .execute(&ctx, &session, "give material 424242 5")
            .await;
        assert_eq!(next_text(&mut rx), "Item does not exist");
    }

    #[tokio::test]
    async fn fragment_give_respects_its_cap() {
        let ctx = test_context();
        let (session, mut rx) = admin_session(&ctx).await;
        ctx.commands
            .execute(&ctx, &session, "give fragment 501 100")
            .await;
        assert_eq!(next_text(&mut rx), "Gave 10 x fragment:501 to Captain9000");
        let guard = session.player().await;
        assert_eq!(
            guard.as_ref().expect("player").inventory.fragment_count(501),
            10
        );
    }
}
