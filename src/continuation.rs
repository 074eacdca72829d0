use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use serenity::all::{
    ButtonStyle, CommandInteraction, Context, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseFollowup, EditInteractionResponse, Message,
};
use serenity::collector::ComponentInteractionCollector;
use tokio_stream::StreamExt;
use tracing::warn;

/// Default lifetime of a refresh button before it goes dark.
pub const DEFAULT_TTL: Duration = Duration::from_secs(90);

const REFRESH_FAILED: &str = "Sorry, the refresh failed. Please try again.";

/// A short-lived "fetch again" affordance tied to one response message.
///
/// Presses are drained from the collector one at a time, so a press that
/// lands while a refresh is in flight waits its turn instead of racing the
/// render; the last completed refresh wins. When the TTL elapses the
/// button is disabled in place and the collector is dropped. Nothing here
/// survives a restart.
pub struct Continuation {
    action_id: &'static str,
    label: &'static str,
    style: ButtonStyle,
    ttl: Duration,
}

impl Continuation {
    pub fn new(action_id: &'static str, label: &'static str) -> Self {
        Self {
            action_id,
            label,
            style: ButtonStyle::Primary,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn action_row(&self) -> CreateActionRow {
        CreateActionRow::Buttons(vec![
            CreateButton::new(self.action_id)
                .label(self.label)
                .style(self.style),
        ])
    }

    fn expired_row(&self) -> CreateActionRow {
        CreateActionRow::Buttons(vec![
            CreateButton::new(self.action_id)
                .label(self.label)
                .style(self.style)
                .disabled(true),
        ])
    }

    /// Service button presses on `message` until the TTL elapses. Each
    /// press is acknowledged immediately, then `refetch` runs and its
    /// embed replaces the current render. A refetch failure becomes an
    /// ephemeral note to the presser, never a dead interaction.
    pub async fn watch<F, Fut>(
        &self,
        ctx: &Context,
        cmd: &CommandInteraction,
        message: &Message,
        refetch: F,
    ) where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<CreateEmbed>>,
    {
        let presses = ComponentInteractionCollector::new(&ctx.shard)
            .message_id(message.id)
            .timeout(self.ttl)
            .stream();
        tokio::pin!(presses);

        while let Some(press) = presses.next().await {
            if press.data.custom_id != self.action_id {
                continue;
            }
            if let Err(err) = press
                .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
                .await
            {
                warn!("failed to acknowledge button press: {}", err);
                continue;
            }

            match refetch().await {
                Ok(embed) => {
                    let edit = EditInteractionResponse::new()
                        .embed(embed)
                        .components(vec![self.action_row()]);
                    if let Err(err) = cmd.edit_response(&ctx.http, edit).await {
                        warn!("failed to update response after refresh: {}", err);
                    }
                }
                Err(err) => {
                    warn!("refresh for {} failed: {:#}", self.action_id, err);
                    let followup = CreateInteractionResponseFollowup::new()
                        .content(REFRESH_FAILED)
                        .ephemeral(true);
                    if let Err(err) = press.create_followup(&ctx.http, followup).await {
                        warn!("failed to send refresh failure notice: {}", err);
                    }
                }
            }
        }

        // TTL elapsed. Late presses from here on hit a disabled button and
        // no collector, so they cannot mutate the render.
        let edit = EditInteractionResponse::new().components(vec![self.expired_row()]);
        if let Err(err) = cmd.edit_response(&ctx.http, edit).await {
            warn!("failed to disable expired button: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_within_the_expected_band() {
        assert!(DEFAULT_TTL >= Duration::from_secs(60));
        assert!(DEFAULT_TTL <= Duration::from_secs(120));
    }
}
