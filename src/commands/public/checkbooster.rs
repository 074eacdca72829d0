use anyhow::Result;
use serenity::all::CreateCommand;
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;

const NAME: &str = "checkbooster";
const DESCRIPTION: &str = "Check if you are a server booster";

pub fn spec() -> CommandSpec {
    CommandSpec {
        name: NAME,
        description: DESCRIPTION,
        tier: Tier::Public,
        build,
        run,
    }
}

fn build() -> CreateCommand {
    CreateCommand::new(NAME).description(DESCRIPTION)
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    let Some(booster_role) = ctx.deps.config.booster_role_id else {
        warn!("BOOSTER_ROLE_ID is not configured");
        ctx.say_ephemeral(
            "The booster role is not configured for this bot. Please contact an administrator.",
        )
        .await?;
        return Ok(());
    };

    let reply = if ctx.caller().roles.contains(&booster_role) {
        "✅ Yes, you are a server booster! Thank you for your support!"
    } else {
        "❌ No, you are not currently a server booster."
    };
    ctx.say_ephemeral(reply).await?;
    Ok(())
}
