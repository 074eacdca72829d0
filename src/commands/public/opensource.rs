use anyhow::Result;
use serenity::all::{Colour, CreateCommand, CreateEmbed, Timestamp};

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;

const NAME: &str = "opensource";
const DESCRIPTION: &str = "Where to find this bot's source code";
const SOURCE_URL: &str = "https://github.com/perkbot-dev/perkbot";

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
    let embed = CreateEmbed::new()
        .colour(Colour::new(0x2B2D31))
        .title("perkbot is open source")
        .url(SOURCE_URL)
        .description(format!(
            "Bug reports and pull requests are welcome:\n{}",
            SOURCE_URL
        ))
        .timestamp(Timestamp::now());
    ctx.say_embed(embed, false).await?;
    Ok(())
}
