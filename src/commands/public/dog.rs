use anyhow::Result;
use serenity::all::{
    ButtonStyle, Colour, CreateCommand, CreateEmbed, CreateEmbedFooter, EditInteractionResponse,
    Timestamp,
};
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::continuation::Continuation;
use crate::dispatch::CommandCtx;
use crate::fetch;

const NAME: &str = "dog";
const DESCRIPTION: &str = "Get a random dog picture";
const FETCH_FAILED: &str = "Sorry, I couldn't fetch a dog picture at the moment. Try again later!";

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

fn dog_embed(image_url: &str) -> CreateEmbed {
    CreateEmbed::new()
        .colour(Colour::new(0xFFC0CB))
        .title("Here's a random dog!")
        .image(image_url)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new("Powered by dog.ceo"))
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    ctx.defer().await?;
    let client = &ctx.deps.http;

    let image = match fetch::dog::random_image(client).await {
        Ok(url) => url,
        Err(err) => {
            warn!("dog fetch failed: {:#}", err);
            ctx.edit_content(FETCH_FAILED).await?;
            return Ok(());
        }
    };

    let again = Continuation::new("new_dog", "Get Another Dog").style(ButtonStyle::Success);
    let message = ctx
        .edit(
            EditInteractionResponse::new()
                .embed(dog_embed(&image))
                .components(vec![again.action_row()]),
        )
        .await?;

    again
        .watch(ctx.ctx, ctx.cmd, &message, move || async move {
            Ok(dog_embed(&fetch::dog::random_image(client).await?))
        })
        .await;
    Ok(())
}
