//! Result of reading one product's price.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a single price fetch produced.
///
/// A zero price is a real observation; only `Unavailable` means the page
/// could not be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "value")]
pub enum Observation {
    /// Price currently displayed on the page
    Price(f64),
    /// Fetch or extraction failed, with the reason
    Unavailable(String),
}

impl Observation {
    /// Creates an unavailable observation from any displayable reason.
    pub fn unavailable(reason: impl fmt::Display) -> Self {
        Observation::Unavailable(reason.to_string())
    }

    /// Returns the observed price, if any.
    pub fn price(&self) -> Option<f64> {
        match self {
            Observation::Price(p) => Some(*p),
            Observation::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Observation::Price(_))
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::Price(p) => write!(f, "{}", p),
            Observation::Unavailable(reason) => write!(f, "unavailable ({})", reason),
        }
    }
}
