//! Durable baseline prices, keyed by product id.
//!
//! The whole record is read once at the start of a run and replaced in one
//! step at the end. A reader never sees a half-written file.

use crate::error::{Result, TrackerError};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Product id to baseline price. Ordered so equal records serialize identically.
pub type PriceRecord = BTreeMap<String, f64>;

/// Loads and saves the baseline record.
pub trait PriceStore {
    /// Returns the saved record, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<PriceRecord>;

    /// Replaces the saved record.
    fn save(&self, record: &PriceRecord) -> Result<()>;
}

/// Pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonPriceStore {
    path: PathBuf,
}

impl JsonPriceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn malformed(&self, reason: impl ToString) -> TrackerError {
        TrackerError::MalformedState { path: self.path.clone(), reason: reason.to_string() }
    }
}

impl PriceStore for JsonPriceStore {
    fn load(&self) -> Result<PriceRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state at {}, starting empty", self.path.display());
                return Ok(PriceRecord::new());
            }
            Err(e) => return Err(self.malformed(e)),
        };

        let record: PriceRecord = serde_json::from_str(&content).map_err(|e| self.malformed(e))?;

        if let Some((id, price)) = record.iter().find(|(_, p)| !p.is_finite() || **p < 0.0) {
            return Err(self.malformed(format!("invalid price {} for '{}'", price, id)));
        }

        debug!("Loaded {} baselines from {}", record.len(), self.path.display());
        Ok(record)
    }

    fn save(&self, record: &PriceRecord) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut json = serde_json::to_string_pretty(record).map_err(std::io::Error::other)?;
        json.push('\n');

        // Temp file in the same directory so the rename stays on one filesystem
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!("Saved {} baselines to {}", record.len(), self.path.display());
        Ok(())
    }
}
