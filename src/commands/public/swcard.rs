use anyhow::{Result, anyhow};
use serenity::all::{
    Colour, CreateCommand, CreateEmbed, CreateEmbedFooter, EditInteractionResponse, Timestamp,
};
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::continuation::Continuation;
use crate::dispatch::CommandCtx;
use crate::fetch::{self, swcard::Card};

const NAME: &str = "swcard";
const DESCRIPTION: &str = "Get a random Star Wars Card Trader card";
const NO_CARD: &str = "Couldn't find a card page right now. Try again later!";

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

fn card_embed(card: &Card) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .colour(Colour::new(0xFFE81F))
        .title(card.name.clone())
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new("Star Wars Card Trader Wiki"));
    if let Some(image) = &card.image {
        embed = embed.image(image.clone());
    }
    embed
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    ctx.defer().await?;
    let client = &ctx.deps.http;

    let card = match fetch::swcard::random_card(client).await {
        Ok(Some(card)) => card,
        Ok(None) => {
            ctx.edit_content(NO_CARD).await?;
            return Ok(());
        }
        Err(err) => {
            warn!("swcard fetch failed: {:#}", err);
            ctx.edit_content(NO_CARD).await?;
            return Ok(());
        }
    };

    let again = Continuation::new("new_card", "Get Another Card");
    let message = ctx
        .edit(
            EditInteractionResponse::new()
                .embed(card_embed(&card))
                .components(vec![again.action_row()]),
        )
        .await?;

    again
        .watch(ctx.ctx, ctx.cmd, &message, move || async move {
            match fetch::swcard::random_card(client).await? {
                Some(card) => Ok(card_embed(&card)),
                None => Err(anyhow!("no card page found")),
            }
        })
        .await;
    Ok(())
}
