use anyhow::Result;
use serenity::all::{
    Colour, CreateCommand, CreateEmbed, CreateEmbedFooter, EditInteractionResponse, Timestamp,
};
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::continuation::Continuation;
use crate::dispatch::CommandCtx;
use crate::fetch::{self, joke::Joke};

const NAME: &str = "joke";
const DESCRIPTION: &str = "Get a random joke";
const FETCH_FAILED: &str = "An error occurred while fetching the joke. Please try again later.";

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

fn joke_embed(joke: &Joke) -> CreateEmbed {
    CreateEmbed::new()
        .colour(Colour::new(0x0099FF))
        .title(joke.setup.clone())
        .description(joke.punchline.clone())
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(
            "Powered by official-joke-api.appspot.com",
        ))
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    ctx.defer().await?;
    let client = &ctx.deps.http;

    let joke = match fetch::joke::random_joke(client).await {
        Ok(joke) => joke,
        Err(err) => {
            warn!("joke fetch failed: {:#}", err);
            ctx.edit_content(FETCH_FAILED).await?;
            return Ok(());
        }
    };

    let again = Continuation::new("new_joke", "Get Another Joke");
    let message = ctx
        .edit(
            EditInteractionResponse::new()
                .embed(joke_embed(&joke))
                .components(vec![again.action_row()]),
        )
        .await?;

    again
        .watch(ctx.ctx, ctx.cmd, &message, move || async move {
            Ok(joke_embed(&fetch::joke::random_joke(client).await?))
        })
        .await;
    Ok(())
}
