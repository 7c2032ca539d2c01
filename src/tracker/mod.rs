//! Price-drop reconciliation: one pass over the catalog against the stored baselines.
//!
//! Products are processed strictly in catalog order, one at a time. A product
//! whose price cannot be read is skipped without touching its baseline; the
//! remaining products are still processed. The caller persists the returned
//! record exactly once.

mod rules;

pub use rules::{decide, drop_percent, BaselinePolicy, Decision, Rules};

use crate::amazon::{PriceFetcher, Region};
use crate::catalog::Product;
use crate::config::Config;
use crate::store::PriceRecord;
use crate::telegram::Notifier;
use serde::Serialize;
use tracing::{debug, warn};

/// One alert's worth of data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceDrop {
    pub product_id: String,
    pub name: String,
    pub url: String,
    pub old_price: f64,
    pub new_price: f64,
    pub currency_symbol: String,
}

impl PriceDrop {
    /// Saving relative to the old price, in percent.
    pub fn percent(&self) -> f64 {
        drop_percent(self.old_price, self.new_price)
    }
}

/// What happened to one product during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Outcome {
    Seeded { price: f64 },
    Dropped { old: f64, new: f64, delivered: bool },
    Unchanged { baseline: f64, observed: f64 },
    Skipped { reason: String },
}

/// Per-product line of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductOutcome {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Result of a full pass.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Outcomes in catalog order
    pub products: Vec<ProductOutcome>,
    /// Baselines to persist
    pub record: PriceRecord,
}

impl RunReport {
    pub fn alerts_sent(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Dropped { delivered: true, .. }))
    }

    pub fn alerts_failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Dropped { delivered: false, .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.products.iter().filter(|p| pred(&p.outcome)).count()
    }
}

/// Runs the drop rule over a catalog, sending one alert per qualifying drop.
pub struct Tracker<'a, F, N> {
    fetcher: &'a F,
    notifier: &'a N,
    rules: Rules,
    region: Region,
}

impl<'a, F: PriceFetcher, N: Notifier> Tracker<'a, F, N> {
    pub fn new(fetcher: &'a F, notifier: &'a N, config: &Config) -> Self {
        let rules = Rules {
            policy: config.baseline_policy,
            drop_threshold_percent: config.drop_threshold_percent,
        };
        Self::with_rules(fetcher, notifier, rules, config.region)
    }

    /// `region` supplies the currency symbol for URLs on unknown hosts.
    pub fn with_rules(fetcher: &'a F, notifier: &'a N, rules: Rules, region: Region) -> Self {
        Self { fetcher, notifier, rules, region }
    }

    /// Processes every product and returns the new record alongside the outcomes.
    ///
    /// Baselines for ids absent from `catalog` are carried over unchanged.
    pub async fn run(&self, catalog: &[Product], old: &PriceRecord) -> RunReport {
        let mut report = RunReport { products: Vec::new(), record: old.clone() };

        for product in catalog {
            let previous = old.get(&product.id).copied();
            let (stored, outcome) = self.observe(product, previous).await;

            if let Some(price) = stored {
                report.record.insert(product.id.clone(), price);
            }
            report.products.push(ProductOutcome {
                id: product.id.clone(),
                name: product.name.clone(),
                outcome,
            });
        }

        debug!(
            "Checked {} products: {} alerts sent, {} failed, {} skipped",
            catalog.len(),
            report.alerts_sent(),
            report.alerts_failed(),
            report.skipped()
        );
        report
    }

    /// Evaluates one product and returns the baseline to store for it.
    pub async fn observe(&self, product: &Product, old: Option<f64>) -> (Option<f64>, Outcome) {
        let observation = self.fetcher.fetch(&product.url).await;
        let decision = decide(old, &observation, &self.rules);
        let stored = decision.stored(old);

        let outcome = match decision {
            Decision::Skip { reason } => {
                debug!("Skipping {}: {}", product.id, reason);
                return (stored, Outcome::Skipped { reason });
            }
            Decision::Seed { price } => {
                debug!("Seeding {} at {}", product.id, price);
                Outcome::Seeded { price }
            }
            Decision::Hold { baseline, observed, .. } => {
                debug!("No drop for {}: {} vs baseline {}", product.id, observed, baseline);
                Outcome::Unchanged { baseline, observed }
            }
            Decision::Drop { old: from, new } => {
                debug!("Drop for {}: {} -> {}", product.id, from, new);
                let alert = self.price_drop(product, from, new);

                match self.notifier.notify(&alert).await {
                    Ok(()) => Outcome::Dropped { old: from, new, delivered: true },
                    Err(e) => {
                        // Keep the old baseline so the next run alerts again
                        warn!("Alert for {} not delivered: {}", product.id, e);
                        return (old, Outcome::Dropped { old: from, new, delivered: false });
                    }
                }
            }
        };

        (stored, outcome)
    }

    fn price_drop(&self, product: &Product, old: f64, new: f64) -> PriceDrop {
        let region = Region::from_url(&product.url).unwrap_or(self.region);
        PriceDrop {
            product_id: product.id.clone(),
            name: product.name.clone(),
            url: product.url.clone(),
            old_price: old,
            new_price: new,
            currency_symbol: region.currency_symbol().to_string(),
        }
    }
}
