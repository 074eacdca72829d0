use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber. INFO is the floor for a
/// long-running bot; anything noisier belongs in a debug build.
pub fn init() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
