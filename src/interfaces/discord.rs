use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use serenity::Client;
use serenity::all::{
    Context, CreateAllowedMentions, CreateMessage, EventHandler, GatewayIntents, GuildId,
    Interaction, Ready,
};
use tracing::{error, info};

use crate::dispatch::{self, Deps};

struct Handler {
    deps: Arc<Deps>,
    /// Command registration and the startup announcement happen once, even
    /// when the gateway reconnects and re-fires `ready`.
    announced: AtomicBool,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Connected to Discord as {}", ready.user.name);
        if self.announced.swap(true, Ordering::SeqCst) {
            return;
        }

        let payload = self.deps.registry.registration_payload();
        match GuildId::new(self.deps.config.guild_id)
            .set_commands(&ctx.http, payload)
            .await
        {
            Ok(registered) => {
                info!("Registered {} slash commands", registered.len());
                announce_commands(&ctx, &self.deps).await;
            }
            Err(err) => error!("Failed to register slash commands: {}", err),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(cmd) = interaction {
            dispatch::dispatch(&ctx, &cmd, &self.deps).await;
        }
    }
}

/// Post the startup command summary to the notify channel, mentioning the
/// configured role when there is one. Best effort; the bot runs fine
/// without the announcement.
async fn announce_commands(ctx: &Context, deps: &Deps) {
    let Some(channel) = deps.config.notify_channel_id else {
        return;
    };

    let lines: Vec<String> = deps
        .registry
        .all()
        .map(|spec| format!("✅ `/{}`", spec.name))
        .collect();
    let mut content = format!(
        "🆕 Bot has been updated with the following commands:\n{}",
        lines.join("\n")
    );

    let mut message = CreateMessage::new();
    if let Some(role) = deps.config.notify_role_id {
        content = format!("<@&{}> {}", role.get(), content);
        message = message.allowed_mentions(CreateAllowedMentions::new().roles(vec![role]));
    }

    if let Err(err) = channel.send_message(&ctx.http, message.content(content)).await {
        error!("Failed to send startup notification: {}", err);
    }
}

/// Connect the gateway client and block until it exits.
pub async fn run(deps: Arc<Deps>) -> Result<()> {
    let intents = GatewayIntents::GUILDS;
    let handler = Handler {
        deps: deps.clone(),
        announced: AtomicBool::new(false),
    };

    let mut client = Client::builder(&deps.config.discord_token, intents)
        .event_handler(handler)
        .await?;
    client.start().await?;
    Ok(())
}
