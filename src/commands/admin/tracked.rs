use anyhow::Result;
use serenity::all::{
    Colour, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed, ResolvedOption,
    ResolvedValue, Timestamp,
};

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;

const NAME: &str = "tracked";
const DESCRIPTION: &str = "Manage the price tracker";

pub fn spec() -> CommandSpec {
    CommandSpec {
        name: NAME,
        description: DESCRIPTION,
        tier: Tier::Admin,
        build,
        run,
    }
}

fn build() -> CreateCommand {
    CreateCommand::new(NAME)
        .description(DESCRIPTION)
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "list",
            "List all tracked items",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "remove",
                "Stop tracking an item",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "key",
                    "The item key, as shown by /tracked list",
                )
                .required(true),
            ),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "checknow",
            "Run a price check right now",
        ))
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

fn sub_key_arg(args: &[ResolvedOption<'_>]) -> Option<String> {
    args.iter()
        .find(|arg| arg.name == "key")
        .and_then(|arg| match &arg.value {
            ResolvedValue::String(value) => Some(value.to_string()),
            _ => None,
        })
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    let options = ctx.cmd.data.options();
    let Some(first) = options.first() else {
        ctx.say_ephemeral("Pick a tracker subcommand.").await?;
        return Ok(());
    };

    match &first.value {
        ResolvedValue::SubCommand(args) => match first.name {
            "list" => list(ctx).await,
            "remove" => remove(ctx, sub_key_arg(args)).await,
            "checknow" => check_now(ctx).await,
            _ => Ok(()),
        },
        _ => {
            ctx.say_ephemeral("Pick a tracker subcommand.").await?;
            Ok(())
        }
    }
}

async fn list(ctx: &CommandCtx<'_>) -> Result<()> {
    let items = ctx.deps.store.snapshot().await;
    if items.is_empty() {
        ctx.say_ephemeral("No items are currently being tracked.")
            .await?;
        return Ok(());
    }

    let mut embed = CreateEmbed::new()
        .colour(Colour::new(0xFF9900))
        .title(format!("Tracked Items ({})", items.len()))
        .timestamp(Timestamp::now());
    // Embed field limit; whoever tracks more than this can page via remove.
    for item in items.iter().take(25) {
        embed = embed.field(
            item.title.clone(),
            format!("`{}` - {}\n{}", item.key, item.last_price, item.url),
            false,
        );
    }
    ctx.say_embed(embed, true).await?;
    Ok(())
}

async fn remove(ctx: &CommandCtx<'_>, key: Option<String>) -> Result<()> {
    let Some(key) = key else {
        ctx.say_ephemeral("Please provide the key of the item to remove.")
            .await?;
        return Ok(());
    };
    if ctx.deps.store.remove(&key).await? {
        ctx.say_ephemeral(format!("Stopped tracking `{}`.", key))
            .await?;
    } else {
        ctx.say_ephemeral(format!("No tracked item with key `{}`.", key))
            .await?;
    }
    Ok(())
}

async fn check_now(ctx: &CommandCtx<'_>) -> Result<()> {
    ctx.defer_ephemeral().await?;
    let report = ctx.deps.watcher.run_once().await;
    let summary = if report.skipped {
        "A price check is already running; this trigger was skipped.".to_string()
    } else {
        format!(
            "Price check finished: {} checked, {} changed, {} failed.",
            report.checked, report.changed, report.failed
        )
    };
    ctx.edit_content(summary).await?;
    Ok(())
}
