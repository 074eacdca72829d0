use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::store::{TrackedItem, TrackedItemStore};
use crate::fetch::amazon::{self, ProductSnapshot};

/// Where current prices come from. The watcher only knows this trait so
/// tests can substitute a canned source.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ProductSnapshot>;
}

/// Where change alerts go. Same deal: the real impl posts to Discord,
/// tests count calls.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn notify(
        &self,
        item: &TrackedItem,
        current: &ProductSnapshot,
        direction: PriceMove,
    ) -> Result<()>;
}

/// The production source: scrape the product page.
pub struct AmazonSource {
    client: reqwest::Client,
}

impl AmazonSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriceSource for AmazonSource {
    async fn fetch(&self, url: &str) -> Result<ProductSnapshot> {
        amazon::scrape_product(&self.client, url).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceMove {
    Drop,
    Rise,
    Other,
}

/// Trim and collapse whitespace so cosmetic markup changes don't read as
/// price changes.
pub fn normalize_price(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_amount(price: &str) -> Option<f64> {
    let digits: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

/// Direction of a change for presentation only; equality was already ruled
/// out by the caller's exact comparison.
pub fn classify(old: &str, new: &str) -> PriceMove {
    match (parse_amount(old), parse_amount(new)) {
        (Some(before), Some(after)) if after < before => PriceMove::Drop,
        (Some(before), Some(after)) if after > before => PriceMove::Rise,
        _ => PriceMove::Other,
    }
}

/// What one watcher run did. `skipped` means the overlap guard bounced the
/// trigger because a previous run was still going.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub checked: usize,
    pub changed: usize,
    pub failed: usize,
    pub skipped: bool,
}

/// The recurring price check. One run walks a snapshot of the store taken
/// at run start, strictly sequentially and with a fixed delay between
/// fetches so the scraped site sees a polite cadence.
pub struct PriceWatcher {
    store: Arc<TrackedItemStore>,
    source: Arc<dyn PriceSource>,
    notifier: Arc<dyn ChangeNotifier>,
    fetch_delay: Duration,
    /// Overlap guard: held for the duration of a run. A trigger that
    /// cannot take it immediately is dropped, not queued.
    running: Mutex<()>,
}

impl PriceWatcher {
    pub fn new(
        store: Arc<TrackedItemStore>,
        source: Arc<dyn PriceSource>,
        notifier: Arc<dyn ChangeNotifier>,
        fetch_delay: Duration,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            fetch_delay,
            running: Mutex::new(()),
        }
    }

    pub async fn run_once(&self) -> RunReport {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("price check still running, skipping this trigger");
            return RunReport {
                skipped: true,
                ..RunReport::default()
            };
        };

        let entries = self.store.snapshot().await;
        let mut report = RunReport::default();

        for (index, entry) in entries.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.fetch_delay).await;
            }

            let current = match self.source.fetch(&entry.url).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!("price fetch failed for {}: {:#}", entry.key, err);
                    report.failed += 1;
                    continue;
                }
            };
            report.checked += 1;

            let new_price = normalize_price(&current.price);
            if new_price == normalize_price(&entry.last_price) {
                continue;
            }

            let direction = classify(&entry.last_price, &new_price);
            if let Err(err) = self.notifier.notify(entry, &current, direction).await {
                // Leave last_price alone so the change is re-detected and
                // re-announced on the next run instead of silently lost.
                warn!(
                    "price alert for {} failed, will retry next run: {:#}",
                    entry.key, err
                );
                report.failed += 1;
                continue;
            }

            match self.store.update_price(&entry.key, &new_price).await {
                Ok(true) => report.changed += 1,
                Ok(false) => {
                    info!("tracked item {} was removed mid-run", entry.key);
                }
                Err(err) => {
                    warn!("failed to persist new price for {}: {:#}", entry.key, err);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use tempfile::tempdir;
    use tokio::sync::Notify;

    use super::*;

    fn item(key: &str, price: &str) -> TrackedItem {
        TrackedItem {
            key: key.to_string(),
            url: format!("https://www.amazon.com/dp/{}", key),
            title: format!("Item {}", key),
            last_price: price.to_string(),
            notify_channel: 400,
            created_at: Utc::now(),
        }
    }

    fn snapshot_for(url: &str, price: &str) -> ProductSnapshot {
        ProductSnapshot {
            title: "Item".to_string(),
            price: price.to_string(),
            image: None,
            url: url.to_string(),
        }
    }

    /// Returns a fixed price per URL; URLs missing from the map fail.
    struct FixedSource {
        prices: HashMap<String, String>,
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn fetch(&self, url: &str) -> Result<ProductSnapshot> {
            match self.prices.get(url) {
                Some(price) => Ok(snapshot_for(url, price)),
                None => Err(anyhow::anyhow!("fetch failed")),
            }
        }
    }

    struct CountingNotifier {
        sent: AtomicUsize,
        fail: bool,
    }

    impl CountingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                sent: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChangeNotifier for CountingNotifier {
        async fn notify(
            &self,
            _item: &TrackedItem,
            _current: &ProductSnapshot,
            _direction: PriceMove,
        ) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(anyhow::anyhow!("delivery failed"))
            } else {
                Ok(())
            }
        }
    }

    async fn store_with(dir: &tempfile::TempDir, items: Vec<TrackedItem>) -> Arc<TrackedItemStore> {
        let store =
            Arc::new(TrackedItemStore::load(dir.path().join("tracked-items.json")).unwrap());
        for item in items {
            store.insert(item).await.unwrap();
        }
        store
    }

    fn watcher(
        store: Arc<TrackedItemStore>,
        prices: &[(&str, &str)],
        notifier: Arc<CountingNotifier>,
    ) -> PriceWatcher {
        let prices = prices
            .iter()
            .map(|(key, price)| {
                (
                    format!("https://www.amazon.com/dp/{}", key),
                    price.to_string(),
                )
            })
            .collect();
        PriceWatcher::new(
            store,
            Arc::new(FixedSource { prices }),
            notifier,
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn unchanged_price_sends_no_notification() {
        let dir = tempdir().unwrap();
        let store = store_with(&dir, vec![item("B00TEST123", "$10.00")]).await;
        let notifier = Arc::new(CountingNotifier::new(false));
        let watcher = watcher(store.clone(), &[("B00TEST123", "$10.00")], notifier.clone());

        let report = watcher.run_once().await;
        assert_eq!(report.checked, 1);
        assert_eq!(report.changed, 0);
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);
        assert_eq!(store.get("B00TEST123").await.unwrap().last_price, "$10.00");
    }

    #[tokio::test]
    async fn changed_price_notifies_once_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracked-items.json");
        let store = store_with(&dir, vec![item("B00TEST123", "$10.00")]).await;
        let notifier = Arc::new(CountingNotifier::new(false));
        let watcher = watcher(store.clone(), &[("B00TEST123", "$8.00")], notifier.clone());

        let report = watcher.run_once().await;
        assert_eq!(report.changed, 1);
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);

        let reloaded = TrackedItemStore::load(path).unwrap();
        assert_eq!(reloaded.get("B00TEST123").await.unwrap().last_price, "$8.00");
    }

    #[tokio::test]
    async fn failed_notification_keeps_state_for_retry() {
        let dir = tempdir().unwrap();
        let store = store_with(&dir, vec![item("B00TEST123", "$10.00")]).await;
        let failing = Arc::new(CountingNotifier::new(true));
        let watcher = watcher(store.clone(), &[("B00TEST123", "$8.00")], failing.clone());

        let report = watcher.run_once().await;
        assert_eq!(report.changed, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(store.get("B00TEST123").await.unwrap().last_price, "$10.00");

        // The next run sees the same difference and announces it again.
        watcher.run_once().await;
        assert_eq!(failing.sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn one_failing_fetch_does_not_abort_the_run() {
        let dir = tempdir().unwrap();
        let store = store_with(
            &dir,
            vec![item("B00AAAAAAA", "$1.00"), item("B00BBBBBBB", "$2.00")],
        ).await;
        let notifier = Arc::new(CountingNotifier::new(false));
        // Only the second item has a price; the first fetch fails.
        let watcher = watcher(store.clone(), &[("B00BBBBBBB", "$3.00")], notifier.clone());

        let report = watcher.run_once().await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.checked, 1);
        assert_eq!(report.changed, 1);
        assert_eq!(store.get("B00BBBBBBB").await.unwrap().last_price, "$3.00");
    }

    /// Blocks inside fetch until released, to hold a run open.
    struct GateSource {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl PriceSource for GateSource {
        async fn fetch(&self, url: &str) -> Result<ProductSnapshot> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(snapshot_for(url, "$1.00"))
        }
    }

    #[tokio::test]
    async fn overlapping_trigger_is_skipped() {
        let dir = tempdir().unwrap();
        let store = store_with(&dir, vec![item("B00TEST123", "$1.00")]).await;
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let watcher = Arc::new(PriceWatcher::new(
            store,
            Arc::new(GateSource {
                entered: entered.clone(),
                release: release.clone(),
            }),
            Arc::new(CountingNotifier::new(false)),
            Duration::ZERO,
        ));

        let first = tokio::spawn({
            let watcher = watcher.clone();
            async move { watcher.run_once().await }
        });
        entered.notified().await;

        let second = watcher.run_once().await;
        assert!(second.skipped);
        assert_eq!(second.checked, 0);

        release.notify_one();
        let first = first.await.unwrap();
        assert!(!first.skipped);
        assert_eq!(first.checked, 1);
    }

    #[test]
    fn classify_detects_direction() {
        assert_eq!(classify("$10.00", "$8.49"), PriceMove::Drop);
        assert_eq!(classify("$10.00", "$12.00"), PriceMove::Rise);
        assert_eq!(classify("unavailable", "$12.00"), PriceMove::Other);
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_price("  $1,299.00 \n"), "$1,299.00");
        assert_eq!(normalize_price("$12 . 99"), "$12 . 99");
    }
}
