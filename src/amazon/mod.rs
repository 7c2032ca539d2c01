//! Amazon product page fetching and price extraction.

pub mod client;
pub mod models;
pub mod parser;
pub mod regions;
pub mod selectors;

pub use client::{AmazonClient, PriceFetcher};
pub use models::Observation;
pub use parser::Parser;
pub use regions::Region;
