use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serenity::all::{ChannelId, Colour, CreateEmbed, CreateEmbedFooter, CreateMessage, Timestamp};
use serenity::http::Http;

use super::store::TrackedItem;
use super::watcher::{ChangeNotifier, PriceMove};
use crate::fetch::amazon::ProductSnapshot;

/// Posts price-change alerts to the item's notify channel. Built on a
/// standalone `Http` so the watcher does not depend on the gateway
/// connection being up.
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn headline(direction: PriceMove) -> &'static str {
    match direction {
        PriceMove::Drop => "📉 Price drop!",
        PriceMove::Rise => "📈 Price increase",
        PriceMove::Other => "🔄 Price changed",
    }
}

fn embed_colour(direction: PriceMove) -> Colour {
    match direction {
        PriceMove::Drop => Colour::new(0x57F287),
        PriceMove::Rise => Colour::new(0xED4245),
        PriceMove::Other => Colour::new(0xFEE75C),
    }
}

#[async_trait]
impl ChangeNotifier for DiscordNotifier {
    async fn notify(
        &self,
        item: &TrackedItem,
        current: &ProductSnapshot,
        direction: PriceMove,
    ) -> Result<()> {
        let mut embed = CreateEmbed::new()
            .title(current.title.clone())
            .url(item.url.clone())
            .colour(embed_colour(direction))
            .field("Was", item.last_price.clone(), true)
            .field("Now", current.price.clone(), true)
            .footer(CreateEmbedFooter::new("Amazon Price Tracker"))
            .timestamp(Timestamp::now());
        if let Some(image) = &current.image {
            embed = embed.image(image.clone());
        }

        let message = CreateMessage::new()
            .content(headline(direction))
            .embed(embed);
        ChannelId::new(item.notify_channel)
            .send_message(&self.http, message)
            .await?;
        Ok(())
    }
}
