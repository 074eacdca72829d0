use anyhow::Result;
use serenity::all::{
    Colour, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed, Timestamp,
};

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;

const NAME: &str = "listofcommands";
const DESCRIPTION: &str = "List available commands, optionally filtered by tier";

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
    CreateCommand::new(NAME).description(DESCRIPTION).add_option(
        CreateCommandOption::new(CommandOptionType::String, "filter", "Which commands to list")
            .required(false)
            .add_string_choice("All", "all")
            .add_string_choice("Public", "public")
            .add_string_choice("Booster", "booster")
            .add_string_choice("Admin", "admin")
            .add_string_choice("Owner", "owner")
            .add_string_choice("Available to you", "available"),
    )
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    let registry = &ctx.deps.registry;
    let filter = ctx.str_option("filter").unwrap_or_else(|| "all".to_string());

    let (title, list) = match filter.as_str() {
        "public" => ("Public Commands", registry.by_tier(Tier::Public)),
        "booster" => ("Booster-Only Commands", registry.by_tier(Tier::Booster)),
        "admin" => ("Admin-Only Commands", registry.by_tier(Tier::Admin)),
        "owner" => ("Owner-Only Commands", registry.by_tier(Tier::Owner)),
        "available" => (
            "Commands Available to You",
            registry.accessible_to(&ctx.caller(), &ctx.deps.config),
        ),
        _ => ("All Commands", registry.all().collect()),
    };

    let mut embed = CreateEmbed::new()
        .colour(Colour::new(0x0099FF))
        .title(title)
        .timestamp(Timestamp::now());
    if list.is_empty() {
        embed = embed.field(
            "No Commands Found",
            "There are no commands in this category.",
            false,
        );
    } else {
        for spec in list {
            embed = embed.field(format!("/{}", spec.name), spec.description, false);
        }
    }

    ctx.say_embed(embed, true).await?;
    Ok(())
}
