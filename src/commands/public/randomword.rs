use anyhow::Result;
use serenity::all::{
    Colour, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter,
    Timestamp,
};

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;
use crate::fetch;

const NAME: &str = "randomword";
const DESCRIPTION: &str = "Get one or more random words";

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
    CreateCommand::new(NAME).description(DESCRIPTION).add_option(
        CreateCommandOption::new(
            CommandOptionType::Integer,
            "count",
            "How many words to get (default 1, max 100)",
        )
        .required(false)
        .min_int_value(1)
        .max_int_value(100),
    )
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    ctx.defer().await?;

    let count = ctx.int_option("count").unwrap_or(1).clamp(1, 100) as usize;
    let words = fetch::words::random_words(count);
    if words.is_empty() {
        ctx.edit_content("The word list is empty, cannot fetch random words.")
            .await?;
        return Ok(());
    }

    let title = if count > 1 {
        "Here are your random words!"
    } else {
        "Here is your random word!"
    };
    let embed = CreateEmbed::new()
        .colour(Colour::new(0xFA0808))
        .title(title)
        .description(words.join(", "))
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(format!(
            "Requested by {}",
            ctx.cmd.user.name
        )));

    ctx.edit_embed(embed).await?;
    Ok(())
}
