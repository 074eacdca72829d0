use std::time::Duration;

use anyhow::Result;
use serenity::all::{Colour, CreateCommand, CreateEmbed, Timestamp};

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;

const NAME: &str = "botstatus";
const DESCRIPTION: &str = "Show bot uptime and tracker status";

pub fn spec() -> CommandSpec {
    CommandSpec {
        name: NAME,
        description: DESCRIPTION,
        tier: Tier::Owner,
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

fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    let tracked = ctx.deps.store.snapshot().await.len();
    let embed = CreateEmbed::new()
        .colour(Colour::new(0x5865F2))
        .title("📊 Bot Status")
        .field("Uptime", format_uptime(ctx.deps.started_at.elapsed()), true)
        .field("Commands", ctx.deps.registry.count().to_string(), true)
        .field("Tracked items", tracked.to_string(), true)
        .field(
            "Price check cadence",
            format!("`{}`", ctx.deps.config.price_check_cron),
            true,
        )
        .timestamp(Timestamp::now());
    ctx.say_embed(embed, true).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(5)), "5s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
