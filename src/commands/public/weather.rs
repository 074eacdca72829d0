use anyhow::Result;
use serenity::all::{
    Colour, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter,
    ResolvedOption, ResolvedValue, Timestamp,
};
use tracing::warn;

use crate::commands::{CommandSpec, HandlerFuture, Tier};
use crate::dispatch::CommandCtx;
use crate::fetch::{self, weather};

const NAME: &str = "weather";
const DESCRIPTION: &str = "Get weather information for a US location by zip code";
const NOT_CONFIGURED: &str = "The weather API key is not configured. Please contact the bot owner.";
const BAD_ZIP: &str = "Please provide a valid 5-digit US zip code.";

pub fn spec() -> CommandSpec {
    CommandSpec {
        name: NAME,
        description: DESCRIPTION,
        tier: Tier::Public,
        build,
        run,
    }
}

fn zip_option() -> CreateCommandOption {
    CreateCommandOption::new(
        CommandOptionType::String,
        "zipcode",
        "5-digit US zip code (random location if omitted)",
    )
    .required(false)
    .min_length(5)
    .max_length(5)
}

fn build() -> CreateCommand {
    CreateCommand::new(NAME)
        .description(DESCRIPTION)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "current",
                "Get the current weather",
            )
            .add_sub_option(zip_option()),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "forecast",
                "Get the 5-day weather forecast",
            )
            .add_sub_option(zip_option()),
        )
}

fn run<'a>(ctx: &'a CommandCtx<'a>) -> HandlerFuture<'a> {
    Box::pin(execute(ctx))
}

fn sub_zip_arg(args: &[ResolvedOption<'_>]) -> Option<String> {
    args.iter()
        .find(|arg| arg.name == "zipcode")
        .and_then(|arg| match &arg.value {
            ResolvedValue::String(value) => Some(value.to_string()),
            _ => None,
        })
}

fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

async fn execute(ctx: &CommandCtx<'_>) -> Result<()> {
    let Some(api_key) = ctx.deps.config.openweather_api_key.clone() else {
        ctx.say_ephemeral(NOT_CONFIGURED).await?;
        return Ok(());
    };

    let options = ctx.cmd.data.options();
    let Some(first) = options.first() else {
        ctx.say_ephemeral("Pick a weather subcommand.").await?;
        return Ok(());
    };
    let (subcommand, zip_arg) = match &first.value {
        ResolvedValue::SubCommand(args) => (first.name, sub_zip_arg(args)),
        _ => {
            ctx.say_ephemeral("Pick a weather subcommand.").await?;
            return Ok(());
        }
    };

    ctx.defer().await?;
    let client = &ctx.deps.http;

    let (zip, location_note) = match zip_arg {
        Some(zip) if is_valid_zip(&zip) => (zip, String::new()),
        Some(_) => {
            ctx.edit_content(BAD_ZIP).await?;
            return Ok(());
        }
        None => match fetch::zip::random_us_zip(client).await {
            Ok(Some((zip, location))) => {
                (zip, format!(" for a random location: {}", location))
            }
            Ok(None) | Err(_) => {
                ctx.edit_content("Could not fetch a random location. Please try again.")
                    .await?;
                return Ok(());
            }
        },
    };

    match subcommand {
        "current" => current_weather(ctx, client, &api_key, &zip, &location_note).await,
        "forecast" => forecast_weather(ctx, client, &api_key, &zip, &location_note).await,
        _ => Ok(()),
    }
}

async fn current_weather(
    ctx: &CommandCtx<'_>,
    client: &reqwest::Client,
    api_key: &str,
    zip: &str,
    location_note: &str,
) -> Result<()> {
    let report = match weather::current(client, api_key, zip).await {
        Ok(report) => report,
        Err(err) => {
            warn!("weather lookup failed for {}: {:#}", zip, err);
            ctx.edit_content(
                "Could not find weather data for the provided zip code. Please check the number.",
            )
            .await?;
            return Ok(());
        }
    };

    let condition = report.weather.first();
    let description = condition.map(|c| capitalize(&c.description)).unwrap_or_default();
    let temp_f = weather::c_to_f(report.main.temp);
    let feels_f = weather::c_to_f(report.main.feels_like);

    let mut embed = CreateEmbed::new()
        .colour(Colour::new(0x0099FF))
        .title(format!(
            "Current Weather in {} ({}){}",
            report.name, zip, location_note
        ))
        .description(description)
        .field(
            "Temperature",
            format!("{:.1}°C / {:.1}°F", report.main.temp, temp_f),
            true,
        )
        .field(
            "Feels Like",
            format!("{:.1}°C / {:.1}°F", report.main.feels_like, feels_f),
            true,
        )
        .field("Humidity", format!("{}%", report.main.humidity), true)
        .field("Wind Speed", format!("{} m/s", report.wind.speed), true)
        .field("Pressure", format!("{} hPa", report.main.pressure), true)
        .field(
            "Visibility",
            format!("{:.1} km", report.visibility as f64 / 1000.0),
            true,
        )
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new("Powered by OpenWeatherMap"));
    if let Some(condition) = condition {
        embed = embed.thumbnail(weather::icon_url(&condition.icon));
    }

    ctx.edit_embed(embed).await?;
    Ok(())
}

async fn forecast_weather(
    ctx: &CommandCtx<'_>,
    client: &reqwest::Client,
    api_key: &str,
    zip: &str,
    location_note: &str,
) -> Result<()> {
    let forecast = match weather::forecast(client, api_key, zip).await {
        Ok(forecast) => forecast,
        Err(err) => {
            warn!("forecast lookup failed for {}: {:#}", zip, err);
            ctx.edit_content(
                "Could not find forecast data for the provided zip code. Please check the number.",
            )
            .await?;
            return Ok(());
        }
    };

    let mut embed = CreateEmbed::new()
        .colour(Colour::new(0x0099FF))
        .title(format!(
            "5-Day Weather Forecast for {} ({}){}",
            forecast.city.name, zip, location_note
        ))
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new("Powered by OpenWeatherMap"));

    for day in weather::summarize_days(&forecast.list, 5) {
        embed = embed.field(
            day.date.format("%A, %b %e").to_string(),
            format!(
                "**{:.0}°C / {:.0}°F** / {:.0}°C / {:.0}°F - {}",
                day.max_c,
                weather::c_to_f(day.max_c),
                day.min_c,
                weather::c_to_f(day.min_c),
                day.description
            ),
            false,
        );
    }

    ctx.edit_embed(embed).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_validation() {
        assert!(is_valid_zip("90210"));
        assert!(!is_valid_zip("9021"));
        assert!(!is_valid_zip("9021O"));
    }

    #[test]
    fn capitalize_uppercases_only_the_first_letter() {
        assert_eq!(capitalize("scattered clouds"), "Scattered clouds");
        assert_eq!(capitalize(""), "");
    }
}
