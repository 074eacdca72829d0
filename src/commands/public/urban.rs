use anyhow::Result;
use serenity::all::{
    Colour, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter,
    Timestamp,
};
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;
use crate::fetch::{self, urban::UrbanEntry};

const NAME: &str = "urban";
const DESCRIPTION: &str = "Get the definition of a word from Urban Dictionary";
const FETCH_FAILED: &str =
    "An error occurred while fetching the definition. Please try again later.";

/// How many random words to try before giving up when no term was given.
const MAX_RANDOM_ATTEMPTS: usize = 20;

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
        CreateCommandOption::new(CommandOptionType::String, "term", "The word to define")
            .required(false),
    )
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

fn clamp(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

fn entry_embed(entry: &UrbanEntry) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .colour(Colour::new(0x134FE6))
        .title(entry.word.clone())
        .description(clamp(&entry.definition, 4096))
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(format!(
            "👍 {}   👎 {}",
            entry.thumbs_up, entry.thumbs_down
        )));
    if !entry.permalink.is_empty() {
        embed = embed.url(entry.permalink.clone());
    }
    if !entry.example.is_empty() {
        embed = embed.field("Example", clamp(&entry.example, 1024), false);
    }
    embed
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    ctx.defer().await?;
    let client = &ctx.deps.http;

    let entry = match ctx.str_option("term") {
        Some(term) => match fetch::urban::define(client, &term).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                ctx.edit_content(format!("No definition found for **{}**.", term))
                    .await?;
                return Ok(());
            }
            Err(err) => {
                warn!("urban lookup failed: {:#}", err);
                ctx.edit_content(FETCH_FAILED).await?;
                return Ok(());
            }
        },
        None => {
            // No term given: roll random words until one has a definition.
            let mut found = None;
            for _ in 0..MAX_RANDOM_ATTEMPTS {
                let Some(word) = fetch::words::random_word() else {
                    break;
                };
                match fetch::urban::define(client, word).await {
                    Ok(Some(entry)) => {
                        found = Some(entry);
                        break;
                    }
                    Ok(None) => continue,
                    Err(err) => {
                        warn!("urban lookup for random word failed: {:#}", err);
                        continue;
                    }
                }
            }
            match found {
                Some(entry) => entry,
                None => {
                    ctx.edit_content(
                        "Could not find a definition for a random word after several attempts. Please try again.",
                    )
                    .await?;
                    return Ok(());
                }
            }
        }
    };

    ctx.edit_embed(entry_embed(&entry)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_leaves_short_text_alone() {
        assert_eq!(clamp("hello", 10), "hello");
    }

    #[test]
    fn clamp_truncates_with_an_ellipsis() {
        let clamped = clamp("abcdefghij", 5);
        assert_eq!(clamped.chars().count(), 5);
        assert!(clamped.ends_with('…'));
    }
}
