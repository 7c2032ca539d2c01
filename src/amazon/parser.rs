//! Price extraction from Amazon product pages.

use crate::amazon::regions::Region;
use crate::amazon::selectors::{errors, PRICE};
use anyhow::Result;
use scraper::Html;
use tracing::trace;

/// Reads the displayed price from a product page.
pub struct Parser {
    region: Region,
}

impl Parser {
    /// Creates a new parser for the given region.
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    /// Extracts the current price from a product page.
    ///
    /// Fails when the page is a CAPTCHA or error page, when no price element
    /// is present (out of stock, layout change) or when its text is not a number.
    pub fn parse_price(&self, html: &str) -> Result<f64> {
        let document = Html::parse_document(html);

        self.check_for_captcha(&document)?;

        let Some(text) = PRICE.iter().find_map(|selector| {
            document
                .select(selector)
                .map(|e| e.text().collect::<String>())
                .find(|t| !t.trim().is_empty())
        }) else {
            self.check_for_error_page(&document)?;
            anyhow::bail!("Price element not found on page");
        };

        trace!("Raw price text: {:?}", text);

        match self.parse_price_value(&text) {
            Some(price) => Ok(price),
            None => anyhow::bail!("Could not parse price text '{}'", text.trim()),
        }
    }

    /// Fails on a CAPTCHA challenge.
    fn check_for_captcha(&self, document: &Html) -> Result<()> {
        if document.select(&errors::CAPTCHA).next().is_some() {
            anyhow::bail!("CAPTCHA detected. Amazon is blocking requests.");
        }
        Ok(())
    }

    /// Fails on Amazon's dog error page. Only consulted once no price was found.
    fn check_for_error_page(&self, document: &Html) -> Result<()> {
        if document.select(&errors::DOG_PAGE).next().is_some() {
            anyhow::bail!("Amazon error page detected (503).");
        }
        Ok(())
    }

    /// Parses a price value from text, handling different regional formats.
    ///
    /// Currency symbols, whitespace and thousands separators are dropped;
    /// for a range like "₹499 - ₹899" the lower bound is returned.
    pub fn parse_price_value(&self, text: &str) -> Option<f64> {
        let cleaned: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
            .collect();

        match cleaned.split_once('-') {
            Some((first, _)) => self.parse_single_price(first),
            None => self.parse_single_price(&cleaned),
        }
    }

    /// Parses a single price number.
    fn parse_single_price(&self, text: &str) -> Option<f64> {
        // Symbols like "Rs." leave a stray separator behind
        let cleaned = text.trim_matches(|c| c == '.' || c == ',');
        if cleaned.is_empty() {
            return None;
        }

        let normalized = if self.region.uses_comma_decimal() {
            // EU format: 1.234,56 -> 1234.56
            cleaned.replace('.', "").replace(',', ".")
        } else {
            // US/IN format: 1,23,456.00 -> 123456.00
            cleaned.replace(',', "")
        };

        normalized.parse::<f64>().ok().filter(|p| p.is_finite())
    }
}
