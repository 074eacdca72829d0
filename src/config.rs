use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serenity::all::{ChannelId, RoleId, UserId};

/// Hourly, at the top of the hour (seconds-resolution cron).
pub const DEFAULT_PRICE_CHECK_CRON: &str = "0 0 * * * *";

const DEFAULT_FETCH_DELAY_SECS: u64 = 5;

/// Everything the bot reads from the environment, resolved once at startup.
///
/// The token and guild are required and their absence is fatal. The tier
/// ids (owner, admin role, booster role) are optional: when one is unset
/// the access gate denies that tier instead of crashing or letting anyone
/// through.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub guild_id: u64,
    pub owner_id: Option<UserId>,
    pub admin_role_id: Option<RoleId>,
    pub booster_role_id: Option<RoleId>,
    /// When set, commands are only honored in this channel (see dispatch).
    pub command_channel_id: Option<ChannelId>,
    /// Startup announcements go here.
    pub notify_channel_id: Option<ChannelId>,
    pub notify_role_id: Option<RoleId>,
    /// Price-change alerts go here; tracking is disabled without it.
    pub price_channel_id: Option<ChannelId>,
    pub openweather_api_key: Option<String>,
    pub price_check_cron: String,
    pub fetch_delay: Duration,
    pub data_dir: PathBuf,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let discord_token = env_nonempty("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?;
        let guild_id = env_id("SERVER_GUILD")?.context("SERVER_GUILD is not set")?;

        let data_dir = match env_nonempty("PERKBOT_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("perkbot"),
        };

        Ok(Self {
            discord_token,
            guild_id,
            owner_id: env_id("OWNER_ID")?.map(UserId::new),
            admin_role_id: env_id("ADMIN_ROLE_ID")?.map(RoleId::new),
            booster_role_id: env_id("BOOSTER_ROLE_ID")?.map(RoleId::new),
            command_channel_id: env_id("COMMAND_CHANNEL_ID")?.map(ChannelId::new),
            notify_channel_id: env_id("NOTIFY_CHANNEL_ID")?.map(ChannelId::new),
            notify_role_id: env_id("NOTIFY_ROLE_ID")?.map(RoleId::new),
            price_channel_id: env_id("PRICE_CHANNEL_ID")?.map(ChannelId::new),
            openweather_api_key: env_nonempty("OPENWEATHER_API_KEY"),
            price_check_cron: env_nonempty("PRICE_CHECK_CRON")
                .unwrap_or_else(|| DEFAULT_PRICE_CHECK_CRON.to_string()),
            fetch_delay: Duration::from_secs(
                env_id("PRICE_FETCH_DELAY_SECS")?.unwrap_or(DEFAULT_FETCH_DELAY_SECS),
            ),
            data_dir,
        })
    }

    pub fn tracked_items_path(&self) -> PathBuf {
        self.data_dir.join("tracked-items.json")
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric id from the environment. Unset or blank is `None`;
/// present but non-numeric (or zero, which snowflake ids never are) is an
/// error so a typo'd id fails loudly instead of silently denying everyone.
fn env_id(name: &str) -> Result<Option<u64>> {
    match env_nonempty(name) {
        None => Ok(None),
        Some(raw) => {
            let parsed: u64 = raw
                .parse()
                .with_context(|| format!("{} must be a numeric id, got {:?}", name, raw))?;
            anyhow::ensure!(parsed != 0, "{} must be a non-zero id", name);
            Ok(Some(parsed))
        }
    }
}

#[cfg(test)]
impl BotConfig {
    /// A fully-populated config for gate and dispatch tests.
    pub(crate) fn for_tests() -> Self {
        Self {
            discord_token: "test-token".to_string(),
            guild_id: 9000,
            owner_id: Some(UserId::new(100)),
            admin_role_id: Some(RoleId::new(200)),
            booster_role_id: Some(RoleId::new(300)),
            command_channel_id: None,
            notify_channel_id: None,
            notify_role_id: None,
            price_channel_id: Some(ChannelId::new(400)),
            openweather_api_key: None,
            price_check_cron: DEFAULT_PRICE_CHECK_CRON.to_string(),
            fetch_delay: Duration::ZERO,
            data_dir: PathBuf::from("/tmp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_items_path_is_under_data_dir() {
        let config = BotConfig::for_tests();
        assert_eq!(
            config.tracked_items_path(),
            PathBuf::from("/tmp/tracked-items.json")
        );
    }

    #[test]
    fn default_cadence_is_hourly() {
        assert_eq!(DEFAULT_PRICE_CHECK_CRON, "0 0 * * * *");
    }
}
