//! One-off price lookup that touches neither state nor Telegram.

use crate::amazon::{AmazonClient, Observation, PriceFetcher, Region};
use crate::config::{Config, OutputFormat};
use crate::format::format_price;
use anyhow::{Context, Result};
use tracing::info;

/// Fetches and prints the current price of a single URL.
pub struct CheckCommand {
    config: Config,
}

impl CheckCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self, url: &str) -> Result<String> {
        let client = AmazonClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, url).await
    }

    /// Looks up a price with a provided fetcher (for testing).
    ///
    /// An unavailable price is an error here, unlike during a run.
    pub async fn execute_with_client(&self, client: &impl PriceFetcher, url: &str) -> Result<String> {
        let url = url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Invalid URL: '{}'. Expected an http(s) product page URL.", url);
        }

        info!("Checking price: {}", url);

        let observation = client.fetch(url).await;
        if let Observation::Unavailable(reason) = &observation {
            anyhow::bail!("Price unavailable: {}", reason);
        }

        Ok(match self.config.format {
            OutputFormat::Json => serde_json::to_string_pretty(&observation)?,
            OutputFormat::Text => {
                let symbol = Region::from_url(url).unwrap_or(self.config.region).currency_symbol();
                let price = observation.price().unwrap_or_default();
                format!("{}{}  {}", symbol, format_price(price), url)
            }
        })
    }
}
