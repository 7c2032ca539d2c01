//! The static list of tracked products.

use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// A tracked product. `id` is the only key used for price lookups; `name`
/// is display text and may change between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), url: url.into() }
    }
}

/// Loads and validates a catalog file: a JSON array of products.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Product>> {
    let path = path.as_ref();
    let invalid = |reason: String| TrackerError::Catalog { path: path.to_path_buf(), reason };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let products: Vec<Product> =
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    validate(&products).map_err(invalid)?;

    debug!("Loaded {} products from {}", products.len(), path.display());
    Ok(products)
}

/// Rejects blank fields and duplicate ids.
pub fn validate(products: &[Product]) -> std::result::Result<(), String> {
    let mut seen = HashSet::new();

    for (i, p) in products.iter().enumerate() {
        if p.id.trim().is_empty() {
            return Err(format!("product #{} has an empty id", i + 1));
        }
        if p.url.trim().is_empty() {
            return Err(format!("product '{}' has an empty url", p.id));
        }
        if !seen.insert(p.id.as_str()) {
            return Err(format!("duplicate product id '{}'", p.id));
        }
    }

    Ok(())
}
