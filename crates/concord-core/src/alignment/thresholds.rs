//! Thresholds that drive alignment classification.

use serde::{Deserialize, Serialize};

use crate::domain::error::{ConcordError, Result};

/// Classification thresholds, injected per call.
///
/// No `Default`: the engine only classifies against values a caller chose.
/// Default values live in the CLI config layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentThresholds {
    /// Confidence spread above which confidences count as diverging.
    pub soft_disagreement_spread: f64,
    /// When `true`, any conflict on the decision value is a hard disagreement.
    /// When `false`, a value conflict is only hard if the confidence spread
    /// also exceeds `soft_disagreement_spread`.
    pub hard_disagreement_requires_value_conflict: bool,
    /// Average confidence below which producers are considered unsure.
    pub insufficient_signal_confidence_floor: f64,
    /// Spread below which unsure producers are considered uniformly unsure.
    pub insufficient_signal_spread_ceiling: f64,
}

impl AlignmentThresholds {
    pub fn new(
        soft_disagreement_spread: f64,
        hard_disagreement_requires_value_conflict: bool,
        insufficient_signal_confidence_floor: f64,
        insufficient_signal_spread_ceiling: f64,
    ) -> Self {
        Self {
            soft_disagreement_spread,
            hard_disagreement_requires_value_conflict,
            insufficient_signal_confidence_floor,
            insufficient_signal_spread_ceiling,
        }
    }

    /// Every numeric threshold must be finite and within `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("soft_disagreement_spread", self.soft_disagreement_spread),
            (
                "insufficient_signal_confidence_floor",
                self.insufficient_signal_confidence_floor,
            ),
            (
                "insufficient_signal_spread_ceiling",
                self.insufficient_signal_spread_ceiling,
            ),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConcordError::InvalidThresholds(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
