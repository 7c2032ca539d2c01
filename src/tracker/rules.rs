//! The per-product drop rule, free of I/O.

use crate::amazon::Observation;
use serde::{Deserialize, Serialize};

/// Slack for float error when comparing a drop against the threshold, in
/// percentage points. Far below the 0.01 resolution of a displayed price.
const THRESHOLD_TOLERANCE: f64 = 1e-9;

/// What the stored baseline becomes when the price did not drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselinePolicy {
    /// Keep the previous baseline; rises are never recorded, so a product
    /// that goes up and back down is only re-alerted below its old low.
    #[default]
    Ratchet,
    /// Record every observed price; alerts still need a strict drop.
    Latest,
}

/// Tunables for [`decide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub policy: BaselinePolicy,
    /// Minimum relative drop in percent; 0 alerts on any decrease.
    pub drop_threshold_percent: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self { policy: BaselinePolicy::Ratchet, drop_threshold_percent: 0.0 }
    }
}

/// Outcome of comparing one observation against the stored baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Nothing observed; baseline stays as it was (possibly absent).
    Skip { reason: String },
    /// First successful observation becomes the baseline, no alert.
    Seed { price: f64 },
    /// Reportable drop; baseline moves to `new` once the alert is delivered.
    Drop { old: f64, new: f64 },
    /// No reportable drop; `store` is what the baseline becomes.
    Hold { baseline: f64, observed: f64, store: f64 },
}

impl Decision {
    /// Baseline to persist, assuming any alert was delivered.
    pub fn stored(&self, old: Option<f64>) -> Option<f64> {
        match self {
            Decision::Skip { .. } => old,
            Decision::Seed { price } => Some(*price),
            Decision::Drop { new, .. } => Some(*new),
            Decision::Hold { store, .. } => Some(*store),
        }
    }
}

/// Applies the drop rule to one product.
pub fn decide(old: Option<f64>, observation: &Observation, rules: &Rules) -> Decision {
    let current = match observation {
        Observation::Price(p) => *p,
        Observation::Unavailable(reason) => return Decision::Skip { reason: reason.clone() },
    };

    let Some(old) = old else {
        return Decision::Seed { price: current };
    };

    if current < old && meets_threshold(old, current, rules.drop_threshold_percent) {
        return Decision::Drop { old, new: current };
    }

    let store = match rules.policy {
        BaselinePolicy::Ratchet => old,
        BaselinePolicy::Latest => current,
    };
    Decision::Hold { baseline: old, observed: current, store }
}

/// Whether the drop from `old` to `new` reaches `threshold` percent (inclusive).
fn meets_threshold(old: f64, new: f64, threshold: f64) -> bool {
    drop_percent(old, new) + THRESHOLD_TOLERANCE >= threshold
}

/// Relative decrease from `old` to `new` in percent.
pub fn drop_percent(old: f64, new: f64) -> f64 {
    if old <= 0.0 {
        return 0.0;
    }
    (old - new) / old * 100.0
}
