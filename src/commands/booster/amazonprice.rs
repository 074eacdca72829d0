use anyhow::Result;
use chrono::Utc;
use serenity::all::{
    Colour, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter,
    CreateMessage, Timestamp,
};
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;
use crate::fetch::amazon;
use crate::tracker::store::{StoreError, TrackedItem};
use crate::tracker::watcher::normalize_price;

const NAME: &str = "amazonprice";
const DESCRIPTION: &str = "Track the price of an Amazon item";
const SCRAPE_FAILED: &str =
    "Could not read product details. The URL might be invalid or the page layout may have changed.";

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
    CreateCommand::new(NAME).description(DESCRIPTION).add_option(
        CreateCommandOption::new(
            CommandOptionType::String,
            "url",
            "The full Amazon product URL",
        )
        .required(true),
    )
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

fn product_embed(product: &amazon::ProductSnapshot) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .colour(Colour::new(0xFF9900))
        .title(product.title.clone())
        .url(product.url.clone())
        .field("Current Price", product.price.clone(), false)
        .footer(CreateEmbedFooter::new("Amazon Price Tracker"))
        .timestamp(Timestamp::now());
    if let Some(image) = &product.image {
        embed = embed.image(image.clone());
    }
    embed
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    ctx.defer_ephemeral().await?;

    let Some(url) = ctx.str_option("url") else {
        ctx.edit_content("Please provide an Amazon product URL.")
            .await?;
        return Ok(());
    };
    if !url.contains("amazon.") {
        ctx.edit_content("Please provide a valid Amazon product URL.")
            .await?;
        return Ok(());
    }
    let Some(price_channel) = ctx.deps.config.price_channel_id else {
        ctx.edit_content("Price tracking is not configured on this server.")
            .await?;
        return Ok(());
    };

    let key = amazon::tracking_key(&url);
    if ctx.deps.store.get(&key).await.is_some() {
        ctx.edit_content(format!(
            "This item is already being tracked (key `{}`).",
            key
        ))
        .await?;
        return Ok(());
    }

    let product = match amazon::scrape_product(&ctx.deps.http, &url).await {
        Ok(product) => product,
        Err(err) => {
            warn!("amazon scrape failed for {}: {:#}", url, err);
            ctx.edit_content(SCRAPE_FAILED).await?;
            return Ok(());
        }
    };
    let item = TrackedItem {
        key: key.clone(),
        url: product.url.clone(),
        title: product.title.clone(),
        last_price: normalize_price(&product.price),
        notify_channel: price_channel.get(),
        created_at: Utc::now(),
    };
    match ctx.deps.store.insert(item).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            ctx.edit_content(format!(
                "This item is already being tracked (key `{}`).",
                key
            ))
            .await?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    // Seed the tracking channel with the starting price so the next alert
    // has something to compare against visually.
    if let Err(err) = price_channel
        .send_message(&ctx.ctx.http, CreateMessage::new().embed(product_embed(&product)))
        .await
    {
        warn!("failed to announce new tracked item {}: {}", key, err);
    }

    ctx.edit_content(format!(
        "Now tracking **{}** (key `{}`). Price updates will be posted in <#{}>.",
        product.title,
        key,
        price_channel.get()
    ))
    .await?;
    Ok(())
}
