//! The scheduled pass: load, reconcile, persist once.

use crate::amazon::{AmazonClient, PriceFetcher};
use crate::catalog;
use crate::config::{Config, OutputFormat};
use crate::format;
use crate::store::{JsonPriceStore, PriceStore};
use crate::telegram::{Notifier, TelegramNotifier};
use crate::tracker::{RunReport, Tracker};
use anyhow::{Context, Result};
use tracing::info;

/// Executes one full tracking run.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs against Amazon and Telegram and returns the formatted report.
    ///
    /// Credentials are checked before anything is fetched.
    pub async fn execute(&self) -> Result<String> {
        let notifier = TelegramNotifier::new(&self.config)?;
        let client = AmazonClient::new(&self.config).context("Failed to create HTTP client")?;
        let store = JsonPriceStore::new(&self.config.state_path);

        let report = self.execute_with(&client, &notifier, &store).await?;

        Ok(match self.config.format {
            OutputFormat::Json => format::format_report_json(&report)?,
            OutputFormat::Text => format::format_report(&report),
        })
    }

    /// Runs with provided collaborators (for testing).
    ///
    /// The state is loaded before any fetch and saved exactly once after the
    /// last product, however many products were skipped or alerted.
    pub async fn execute_with(
        &self,
        fetcher: &impl PriceFetcher,
        notifier: &impl Notifier,
        store: &impl PriceStore,
    ) -> Result<RunReport> {
        let products = catalog::load(&self.config.catalog_path)?;
        let baselines = store.load()?;

        info!("🚀 Checking {} products ({} baselines on record)", products.len(), baselines.len());

        let report = Tracker::new(fetcher, notifier, &self.config).run(&products, &baselines).await;

        store.save(&report.record).context("Failed to save price state")?;
        Ok(report)
    }
}
