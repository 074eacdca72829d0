use anyhow::Result;
use serenity::all::{Colour, CreateCommand, CreateEmbed, CreateEmbedFooter, Timestamp};

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;

const NAME: &str = "boosterperks";
const DESCRIPTION: &str = "A special thank you for our server boosters";

pub fn spec() -> CommandSpec {
    CommandSpec {
        name: NAME,
        description: DESCRIPTION,
        tier: Tier::Booster,
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
    let booster_commands = ctx.deps.registry.by_tier(Tier::Booster).len();

    let embed = CreateEmbed::new()
        .colour(Colour::new(0xF47FFF))
        .title("✨ Thank You for Boosting! ✨")
        .description(format!(
            "Hey {}, thank you for being an amazing server booster! Your support helps the community thrive.\n\nYou currently have access to **{}** booster-exclusive command(s).",
            ctx.cmd.user.name, booster_commands
        ))
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new("We appreciate you!"));

    ctx.say_embed(embed, true).await?;
    Ok(())
}
