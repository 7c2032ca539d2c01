//! Multi-run scenarios through the public API with a real state file.

use amz_price_alert::commands::RunCommand;
use amz_price_alert::error::{Result, TrackerError};
use amz_price_alert::{
    BaselinePolicy, Config, JsonPriceStore, Notifier, Observation, Outcome, PriceDrop,
    PriceFetcher, PriceStore, Product,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

/// Prices can be changed between runs; unset URLs are unavailable.
#[derive(Default)]
struct ScriptedFetcher {
    prices: Mutex<HashMap<String, Observation>>,
}

impl ScriptedFetcher {
    fn set(&self, id: &str, observation: Observation) {
        self.prices.lock().unwrap().insert(url(id), observation);
    }
}

#[async_trait]
impl PriceFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Observation {
        self.prices
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Observation::unavailable("connection reset"))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<PriceDrop>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    fn take(&self) -> Vec<PriceDrop> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, drop: &PriceDrop) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(TrackerError::Notification("Too Many Requests".to_string()));
        }
        self.sent.lock().unwrap().push(drop.clone());
        Ok(())
    }
}

fn url(id: &str) -> String {
    format!("https://www.amazon.in/dp/{}", id)
}

struct Harness {
    _dir: TempDir,
    config: Config,
    store: JsonPriceStore,
    fetcher: ScriptedFetcher,
    notifier: RecordingNotifier,
}

impl Harness {
    fn new(ids: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let products: Vec<Product> =
            ids.iter().map(|id| Product::new(*id, format!("Item {}", id), url(id))).collect();

        let catalog_path = dir.path().join("products.json");
        std::fs::write(&catalog_path, serde_json::to_string_pretty(&products).unwrap()).unwrap();

        let state_path = dir.path().join("prices.json");
        let config = Config { catalog_path, state_path: state_path.clone(), ..Config::default() };

        Self {
            _dir: dir,
            config,
            store: JsonPriceStore::new(state_path),
            fetcher: ScriptedFetcher::default(),
            notifier: RecordingNotifier::default(),
        }
    }

    async fn run(&self) -> amz_price_alert::RunReport {
        RunCommand::new(self.config.clone())
            .execute_with(&self.fetcher, &self.notifier, &self.store)
            .await
            .unwrap()
    }

    fn baseline(&self, id: &str) -> Option<f64> {
        self.store.load().unwrap().get(id).copied()
    }
}

#[tokio::test]
async fn test_first_observation_seeds_without_alert() {
    let h = Harness::new(&["kindle"]);
    h.fetcher.set("kindle", Observation::Price(13999.0));

    let report = h.run().await;

    assert_eq!(h.baseline("kindle"), Some(13999.0));
    assert!(h.notifier.take().is_empty());
    assert_eq!(report.products[0].outcome, Outcome::Seeded { price: 13999.0 });
}

#[tokio::test]
async fn test_drop_alerts_once_and_lowers_baseline() {
    let h = Harness::new(&["echo"]);
    h.fetcher.set("echo", Observation::Price(1000.0));
    h.run().await;

    h.fetcher.set("echo", Observation::Price(900.0));
    h.run().await;

    let sent = h.notifier.take();
    assert_eq!(sent.len(), 1);
    assert_eq!((sent[0].old_price, sent[0].new_price), (1000.0, 900.0));
    assert_eq!(sent[0].url, url("echo"));
    assert_eq!(h.baseline("echo"), Some(900.0));
}

#[tokio::test]
async fn test_rise_keeps_baseline_then_drop_compares_to_it() {
    let h = Harness::new(&["buds"]);
    h.fetcher.set("buds", Observation::Price(900.0));
    h.run().await;

    h.fetcher.set("buds", Observation::Price(950.0));
    h.run().await;
    assert_eq!(h.baseline("buds"), Some(900.0));
    assert!(h.notifier.take().is_empty());

    // back to the old low: no alert
    h.fetcher.set("buds", Observation::Price(900.0));
    h.run().await;
    assert!(h.notifier.take().is_empty());

    h.fetcher.set("buds", Observation::Price(850.0));
    h.run().await;
    let sent = h.notifier.take();
    assert_eq!(sent.len(), 1);
    assert_eq!((sent[0].old_price, sent[0].new_price), (900.0, 850.0));
}

#[tokio::test]
async fn test_latest_policy_tracks_rises() {
    let mut h = Harness::new(&["buds"]);
    h.config.baseline_policy = BaselinePolicy::Latest;

    h.fetcher.set("buds", Observation::Price(900.0));
    h.run().await;
    h.fetcher.set("buds", Observation::Price(950.0));
    h.run().await;
    assert_eq!(h.baseline("buds"), Some(950.0));

    h.fetcher.set("buds", Observation::Price(920.0));
    h.run().await;
    let sent = h.notifier.take();
    assert_eq!((sent[0].old_price, sent[0].new_price), (950.0, 920.0));
}

#[tokio::test]
async fn test_unavailable_product_is_isolated() {
    let h = Harness::new(&["a", "b", "c"]);
    for id in ["a", "b", "c"] {
        h.fetcher.set(id, Observation::Price(100.0));
    }
    h.run().await;

    h.fetcher.set("a", Observation::Price(80.0));
    h.fetcher.set("b", Observation::unavailable("Price element not found on page"));
    h.fetcher.set("c", Observation::Price(70.0));
    let report = h.run().await;

    assert_eq!(h.baseline("a"), Some(80.0));
    assert_eq!(h.baseline("b"), Some(100.0));
    assert_eq!(h.baseline("c"), Some(70.0));

    let ids: Vec<_> = h.notifier.take().into_iter().map(|d| d.product_id).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert!(matches!(report.products[1].outcome, Outcome::Skipped { .. }));
}

#[tokio::test]
async fn test_never_seen_and_unavailable_stays_absent() {
    let h = Harness::new(&["ghost"]);
    h.run().await;

    assert_eq!(h.baseline("ghost"), None);
    assert!(h.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() {
    let h = Harness::new(&["a", "b"]);
    h.fetcher.set("a", Observation::Price(499.0));
    h.fetcher.set("b", Observation::Price(1299.5));
    h.run().await;
    h.run().await;
    let first = std::fs::read(h.store.path()).unwrap();

    h.run().await;
    let second = std::fs::read(h.store.path()).unwrap();

    assert_eq!(first, second);
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn test_failed_delivery_retries_next_run() {
    let h = Harness::new(&["tv"]);
    h.fetcher.set("tv", Observation::Price(30000.0));
    h.run().await;

    h.notifier.set_failing(true);
    h.fetcher.set("tv", Observation::Price(27000.0));
    let report = h.run().await;
    assert_eq!(h.baseline("tv"), Some(30000.0));
    assert_eq!(report.alerts_failed(), 1);

    h.notifier.set_failing(false);
    h.run().await;
    let sent = h.notifier.take();
    assert_eq!(sent.len(), 1);
    assert_eq!((sent[0].old_price, sent[0].new_price), (30000.0, 27000.0));
    assert_eq!(h.baseline("tv"), Some(27000.0));
}

#[tokio::test]
async fn test_drop_threshold() {
    let mut h = Harness::new(&["mouse"]);
    h.config.drop_threshold_percent = 10.0;

    h.fetcher.set("mouse", Observation::Price(1000.0));
    h.run().await;

    h.fetcher.set("mouse", Observation::Price(950.0));
    h.run().await;
    assert!(h.notifier.take().is_empty());
    assert_eq!(h.baseline("mouse"), Some(1000.0));

    h.fetcher.set("mouse", Observation::Price(880.0));
    h.run().await;
    assert_eq!(h.notifier.take().len(), 1);
    assert_eq!(h.baseline("mouse"), Some(880.0));
}
