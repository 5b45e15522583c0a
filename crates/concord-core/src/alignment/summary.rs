//! Alignment states and the immutable summary produced by the analyzer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::schema::DecisionValue;

/// Four-way classification of how well producers agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentState {
    FullAlignment,
    SoftDisagreement,
    HardDisagreement,
    /// Producers are uniformly unsure rather than disagreeing.
    InsufficientSignal,
}

impl AlignmentState {
    /// Wire name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullAlignment => "full_alignment",
            Self::SoftDisagreement => "soft_disagreement",
            Self::HardDisagreement => "hard_disagreement",
            Self::InsufficientSignal => "insufficient_signal",
        }
    }

    /// Parse a wire name back into a state.
    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::FullAlignment,
            Self::SoftDisagreement,
            Self::HardDisagreement,
            Self::InsufficientSignal,
        ]
        .into_iter()
        .find(|state| state.as_str() == s)
    }
}

impl fmt::Display for AlignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the producers differ on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisagreementArea {
    PrimaryDecision,
    ConfidenceLevels,
}

impl DisagreementArea {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryDecision => "primary_decision",
            Self::ConfidenceLevels => "confidence_levels",
        }
    }
}

/// Output of the alignment analyzer.
///
/// # Invariants
///
/// `state` is a pure function of the metrics below and the thresholds used.
/// Producer identity and input ordering never influence it: `dissenting_agents`
/// is sorted, `confidence_distribution` is an ordered map, and aggregates are
/// accumulated in producer-name order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    pub state: AlignmentState,
    /// Weighted score in `[0, 1]`: 0.4 agreement, 0.3 confidence consistency,
    /// 0.3 consensus strength.
    pub alignment_score: f64,
    /// `true` iff every decision value is equal under the schema.
    pub decision_agreement: bool,
    /// Value held by the largest group of producers.
    pub plurality_value: DecisionValue,
    /// `max(confidence) - min(confidence)`.
    pub confidence_spread: f64,
    pub avg_confidence: f64,
    pub confidence_distribution: BTreeMap<String, f64>,
    /// Producers outside the plurality group, sorted by name.
    pub dissenting_agents: Vec<String>,
    pub disagreement_areas: Vec<DisagreementArea>,
    /// Fraction of producers in the plurality group.
    pub consensus_strength: f64,
    /// Short deterministic sentence explaining the state.
    pub resolution_rationale: String,
}

impl AlignmentSummary {
    /// Number of producers that contributed to this summary.
    pub fn agent_count(&self) -> usize {
        self.confidence_distribution.len()
    }

    pub fn requires_escalation(&self) -> bool {
        self.state == AlignmentState::HardDisagreement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_wire_names_roundtrip() {
        for state in [
            AlignmentState::FullAlignment,
            AlignmentState::SoftDisagreement,
            AlignmentState::HardDisagreement,
            AlignmentState::InsufficientSignal,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
            assert_eq!(AlignmentState::parse(state.as_str()), Some(state));
        }
        assert_eq!(AlignmentState::parse("mostly_aligned"), None);
    }

    #[test]
    fn test_only_hard_disagreement_requires_escalation() {
        let mut summary = AlignmentSummary {
            state: AlignmentState::FullAlignment,
            alignment_score: 1.0,
            decision_agreement: true,
            plurality_value: true.into(),
            confidence_spread: 0.0,
            avg_confidence: 0.9,
            confidence_distribution: BTreeMap::from([("a".to_string(), 0.9)]),
            dissenting_agents: vec![],
            disagreement_areas: vec![],
            consensus_strength: 1.0,
            resolution_rationale: "All agents agree".into(),
        };
        for (state, escalates) in [
            (AlignmentState::FullAlignment, false),
            (AlignmentState::SoftDisagreement, false),
            (AlignmentState::InsufficientSignal, false),
            (AlignmentState::HardDisagreement, true),
        ] {
            summary.state = state;
            assert_eq!(summary.requires_escalation(), escalates, "{state}");
        }
    }

    #[test]
    fn test_disagreement_area_wire_names() {
        assert_eq!(
            serde_json::to_string(&DisagreementArea::PrimaryDecision).unwrap(),
            "\"primary_decision\""
        );
        assert_eq!(DisagreementArea::ConfidenceLevels.as_str(), "confidence_levels");
    }
}
