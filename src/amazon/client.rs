//! HTTP price fetcher for Amazon product pages using wreq for TLS fingerprint emulation.

use crate::amazon::models::Observation;
use crate::amazon::parser::Parser;
use crate::amazon::regions::Region;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use std::time::Duration;
use tracing::debug;
use wreq::Client;
use wreq_util::Emulation;

const REFERER: &str = "https://www.google.com/";

/// Reads the current price of a product page - enables mocking for tests.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Fetches the page once and returns its price, or why it could not be read.
    async fn fetch(&self, url: &str) -> Observation;
}

/// Amazon HTTP client with browser impersonation.
pub struct AmazonClient {
    client: Client,
    region: Region,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl AmazonClient {
    /// Creates a new Amazon client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            region: config.region,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Performs a GET request with a browser-like profile.
    async fn get(&self, url: &str, region: Region) -> Result<String> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", region.accept_language())
            .header("Referer", REFERER)
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            anyhow::bail!("Rate limited by Amazon (503)");
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }

    async fn read_price(&self, url: &str) -> Result<f64> {
        let region = Region::from_url(url).unwrap_or(self.region);
        let html = self.get(url, region).await?;
        Parser::new(region).parse_price(&html)
    }

    /// Adds a random delay between product requests.
    async fn delay(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl PriceFetcher for AmazonClient {
    async fn fetch(&self, url: &str) -> Observation {
        match self.read_price(url).await {
            Ok(price) => Observation::Price(price),
            Err(e) => {
                debug!("Price unavailable for {}: {:#}", url, e);
                Observation::unavailable(format!("{:#}", e))
            }
        }
    }
}
