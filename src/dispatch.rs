use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::Result;
use serenity::all::{
    ChannelId, CommandInteraction, Context, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
    Message, ResolvedValue,
};
use tracing::{error, warn};

use crate::access::{self, Caller};
use crate::commands::CommandRegistry;
use crate::config::BotConfig;
use crate::tracker::store::TrackedItemStore;
use crate::tracker::watcher::PriceWatcher;

/// The one command the channel restriction never applies to, so members
/// can always find out where commands are supposed to go.
pub const CHANNEL_RESTRICTION_EXEMPT: &str = "listofcommands";

const GENERIC_ERROR: &str = "There was an error while executing this command!";

/// Shared services handed to every command handler.
pub struct Deps {
    pub config: Arc<BotConfig>,
    pub registry: Arc<CommandRegistry>,
    pub store: Arc<TrackedItemStore>,
    pub watcher: Arc<PriceWatcher>,
    pub http: reqwest::Client,
    pub started_at: Instant,
}

/// One invocation as seen by a handler. The reply helpers record whether
/// the interaction was acknowledged so the dispatcher knows, on failure,
/// whether to append a followup or open a fresh reply.
pub struct CommandCtx<'a> {
    pub ctx: &'a Context,
    pub cmd: &'a CommandInteraction,
    pub deps: &'a Deps,
    acknowledged: AtomicBool,
}

impl<'a> CommandCtx<'a> {
    pub fn new(ctx: &'a Context, cmd: &'a CommandInteraction, deps: &'a Deps) -> Self {
        Self {
            ctx,
            cmd,
            deps,
            acknowledged: AtomicBool::new(false),
        }
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }

    fn mark_acknowledged(&self) {
        self.acknowledged.store(true, Ordering::SeqCst);
    }

    pub fn caller(&self) -> Caller {
        caller_of(self.cmd)
    }

    pub async fn defer(&self) -> Result<()> {
        self.cmd.defer(&self.ctx.http).await?;
        self.mark_acknowledged();
        Ok(())
    }

    pub async fn defer_ephemeral(&self) -> Result<()> {
        self.cmd.defer_ephemeral(&self.ctx.http).await?;
        self.mark_acknowledged();
        Ok(())
    }

    pub async fn say(&self, content: impl Into<String>) -> Result<()> {
        let response = CreateInteractionResponseMessage::new().content(content);
        self.respond(response).await
    }

    pub async fn say_ephemeral(&self, content: impl Into<String>) -> Result<()> {
        let response = CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true);
        self.respond(response).await
    }

    pub async fn say_embed(&self, embed: CreateEmbed, ephemeral: bool) -> Result<()> {
        let response = CreateInteractionResponseMessage::new()
            .embed(embed)
            .ephemeral(ephemeral);
        self.respond(response).await
    }

    async fn respond(&self, message: CreateInteractionResponseMessage) -> Result<()> {
        self.cmd
            .create_response(&self.ctx.http, CreateInteractionResponse::Message(message))
            .await?;
        self.mark_acknowledged();
        Ok(())
    }

    /// Edit the deferred response. Only valid after `defer`.
    pub async fn edit(&self, edit: EditInteractionResponse) -> Result<Message> {
        Ok(self.cmd.edit_response(&self.ctx.http, edit).await?)
    }

    pub async fn edit_content(&self, content: impl Into<String>) -> Result<Message> {
        self.edit(EditInteractionResponse::new().content(content))
            .await
    }

    pub async fn edit_embed(&self, embed: CreateEmbed) -> Result<Message> {
        self.edit(EditInteractionResponse::new().embed(embed)).await
    }

    pub fn str_option(&self, name: &str) -> Option<String> {
        self.cmd
            .data
            .options()
            .into_iter()
            .find(|opt| opt.name == name)
            .and_then(|opt| match opt.value {
                ResolvedValue::String(value) => Some(value.to_string()),
                _ => None,
            })
    }

    pub fn int_option(&self, name: &str) -> Option<i64> {
        self.cmd
            .data
            .options()
            .into_iter()
            .find(|opt| opt.name == name)
            .and_then(|opt| match opt.value {
                ResolvedValue::Integer(value) => Some(value),
                _ => None,
            })
    }
}

pub fn caller_of(cmd: &CommandInteraction) -> Caller {
    Caller {
        user_id: cmd.user.id,
        roles: cmd
            .member
            .as_ref()
            .map(|member| member.roles.clone())
            .unwrap_or_default(),
    }
}

/// Redirect text when the command-channel restriction blocks this
/// invocation; `None` when it may proceed.
pub fn channel_redirect(config: &BotConfig, name: &str, channel: ChannelId) -> Option<String> {
    let restricted = config.command_channel_id?;
    if channel == restricted || name == CHANNEL_RESTRICTION_EXEMPT {
        return None;
    }
    Some(format!("Please use bot commands in <#{}>.", restricted.get()))
}

/// Route one slash-command invocation: channel restriction, registry
/// lookup, tier gate, handler. Every failure ends in exactly one
/// user-visible message; nothing propagates past this function.
pub async fn dispatch(ctx: &Context, cmd: &CommandInteraction, deps: &Deps) {
    let name = cmd.data.name.clone();

    if let Some(redirect) = channel_redirect(&deps.config, &name, cmd.channel_id) {
        respond_ephemeral(ctx, cmd, &redirect).await;
        return;
    }

    let Some(spec) = deps.registry.resolve(&name) else {
        warn!("ignoring unknown command /{}", name);
        return;
    };

    let caller = caller_of(cmd);
    if let Err(deny) = access::authorize(spec.tier, &caller, &deps.config) {
        respond_ephemeral(ctx, cmd, deny.message()).await;
        return;
    }

    let command_ctx = CommandCtx::new(ctx, cmd, deps);
    if let Err(err) = (spec.run)(&command_ctx).await {
        error!("command /{} failed: {:#}", name, err);
        if command_ctx.acknowledged() {
            // A response is already underway (deferred or partial), so
            // append to it instead of racing a second top-level reply.
            let followup = CreateInteractionResponseFollowup::new()
                .content(GENERIC_ERROR)
                .ephemeral(true);
            if let Err(err) = cmd.create_followup(&ctx.http, followup).await {
                error!("failed to send error followup for /{}: {}", name, err);
            }
        } else {
            respond_ephemeral(ctx, cmd, GENERIC_ERROR).await;
        }
    }
}

async fn respond_ephemeral(ctx: &Context, cmd: &CommandInteraction, content: &str) {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );
    if let Err(err) = cmd.create_response(&ctx.http, response).await {
        error!("failed to reply to /{}: {}", cmd.data.name, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_restriction_configured_allows_every_channel() {
        let config = BotConfig::for_tests();
        assert_eq!(
            channel_redirect(&config, "dog", ChannelId::new(1)),
            None
        );
    }

    #[test]
    fn restriction_blocks_other_channels_with_a_redirect() {
        let config = BotConfig {
            command_channel_id: Some(ChannelId::new(77)),
            ..BotConfig::for_tests()
        };
        let redirect = channel_redirect(&config, "dog", ChannelId::new(1)).unwrap();
        assert!(redirect.contains("<#77>"));
        assert_eq!(channel_redirect(&config, "dog", ChannelId::new(77)), None);
    }

    #[test]
    fn exempt_command_bypasses_the_restriction() {
        let config = BotConfig {
            command_channel_id: Some(ChannelId::new(77)),
            ..BotConfig::for_tests()
        };
        assert_eq!(
            channel_redirect(&config, CHANNEL_RESTRICTION_EXEMPT, ChannelId::new(1)),
            None
        );
    }
}
