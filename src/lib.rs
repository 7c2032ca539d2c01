//! amz-price-alert - Amazon price-drop tracker with Telegram alerts
//!
//! Each run loads the product catalog and the stored baseline prices, reads
//! every product's current price, alerts on drops, and writes the new
//! baselines back in one atomic replace.

pub mod amazon;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod store;
pub mod telegram;
pub mod tracker;

pub use amazon::{Observation, PriceFetcher, Region};
pub use catalog::Product;
pub use config::Config;
pub use error::TrackerError;
pub use store::{JsonPriceStore, PriceRecord, PriceStore};
pub use telegram::Notifier;
pub use tracker::{BaselinePolicy, Outcome, PriceDrop, RunReport, Tracker};
