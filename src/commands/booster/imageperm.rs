use std::time::Duration;

use anyhow::Result;
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId,
};
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;

const NAME: &str = "imageperm";
const DESCRIPTION: &str = "Temporarily allow image uploads in this channel";
const DEFAULT_MINUTES: i64 = 5;

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
            CommandOptionType::Integer,
            "duration",
            "How many minutes to allow image uploads (default 5)",
        )
        .required(false)
        .min_int_value(1)
        .max_int_value(60),
    )
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    let Some(guild) = ctx.cmd.guild_id else {
        ctx.say_ephemeral("This command only works in a server.")
            .await?;
        return Ok(());
    };

    let minutes = ctx
        .int_option("duration")
        .unwrap_or(DEFAULT_MINUTES)
        .clamp(1, 60) as u64;
    let channel = ctx.cmd.channel_id;
    // The @everyone role shares the guild's id.
    let everyone = RoleId::new(guild.get());

    let overwrite = PermissionOverwrite {
        allow: Permissions::ATTACH_FILES,
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Role(everyone),
    };
    if let Err(err) = channel.create_permission(&ctx.ctx.http, overwrite).await {
        warn!("failed to open image uploads in {}: {}", channel, err);
        ctx.say_ephemeral(
            "I couldn't change this channel's permissions. Please make sure I have the \"Manage Channels\" permission.",
        )
        .await?;
        return Ok(());
    }

    ctx.say(format!(
        "Image uploads have been enabled in this channel for **{} minute(s)** by our booster, {}!",
        minutes, ctx.cmd.user.name
    ))
    .await?;

    let http = ctx.ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
        if let Err(err) = channel
            .delete_permission(&http, PermissionOverwriteType::Role(everyone))
            .await
        {
            warn!("failed to revert image uploads in {}: {}", channel, err);
        }
    });
    Ok(())
}
