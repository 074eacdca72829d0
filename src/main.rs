mod access;
mod commands;
mod config;
mod continuation;
mod dispatch;
mod fetch;
mod interfaces;
mod logging;
mod tracker;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serenity::http::Http;
use tokio_cron_scheduler::JobScheduler;
use tracing::{error, info};

use crate::commands::CommandRegistry;
use crate::config::BotConfig;
use crate::dispatch::Deps;
use crate::tracker::notify::DiscordNotifier;
use crate::tracker::store::TrackedItemStore;
use crate::tracker::watcher::{AmazonSource, PriceWatcher};

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(err) = run().await {
        error!("fatal: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Startup order matters: bad config or a duplicate command name must
    // stop the process before the gateway connection is attempted.
    let config = Arc::new(BotConfig::from_env()?);
    let registry = Arc::new(CommandRegistry::build()?);
    let store = Arc::new(TrackedItemStore::load(config.tracked_items_path())?);
    info!("Loaded {} tracked items", store.snapshot().await.len());

    let http_client = reqwest::Client::new();
    // The watcher posts through its own Http handle so alerts do not
    // depend on the gateway client's lifecycle.
    let notifier = Arc::new(DiscordNotifier::new(Arc::new(Http::new(
        &config.discord_token,
    ))));
    let source = Arc::new(AmazonSource::new(http_client.clone()));
    let watcher = Arc::new(PriceWatcher::new(
        store.clone(),
        source,
        notifier,
        config.fetch_delay,
    ));

    let scheduler = JobScheduler::new().await?;
    let job_watcher = watcher.clone();
    let job = tokio_cron_scheduler::Job::new_async(
        config.price_check_cron.as_str(),
        move |_uuid, mut _l| {
            let watcher = job_watcher.clone();
            Box::pin(async move {
                let report = watcher.run_once().await;
                if !report.skipped {
                    info!(
                        "Price check finished: {} checked, {} changed, {} failed",
                        report.checked, report.changed, report.failed
                    );
                }
            })
        },
    )?;
    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("Price watcher scheduled ({})", config.price_check_cron);

    let deps = Arc::new(Deps {
        config,
        registry,
        store,
        watcher,
        http: http_client,
        started_at: Instant::now(),
    });
    interfaces::discord::run(deps).await
}
