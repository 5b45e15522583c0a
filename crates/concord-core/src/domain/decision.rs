//! A single producer's finished decision for one task.

use serde::{Deserialize, Serialize};

use super::schema::DecisionValue;

/// One producer's output for one evaluation task.
///
/// Constructed once by whatever produced the decision (LLM agent, human
/// reviewer, heuristic) and never mutated afterwards. `confidence` is expected
/// to be normalized already; see [`DecisionSchema::normalize_confidence`].
///
/// [`DecisionSchema::normalize_confidence`]: super::schema::DecisionSchema::normalize_confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    /// Producer name, unique within a task.
    pub producer: String,
    /// Descriptive role label ("advocate", "skeptic", "judge", ...). Not interpreted.
    pub role: String,
    pub decision_value: DecisionValue,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    #[serde(default)]
    pub rationale: String,
    /// Supporting evidence, in the producer's order. May contain duplicates.
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl AgentDecision {
    pub fn new(
        producer: impl Into<String>,
        role: impl Into<String>,
        decision_value: impl Into<DecisionValue>,
        confidence: f64,
    ) -> Self {
        Self {
            producer: producer.into(),
            role: role.into(),
            decision_value: decision_value.into(),
            confidence,
            rationale: String::new(),
            evidence: Vec::new(),
        }
    }

    /// Attach a rationale (builder pattern).
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Append one evidence item (builder pattern).
    pub fn with_evidence(mut self, item: impl Into<String>) -> Self {
        self.evidence.push(item.into());
        self
    }
}

/// References to `decisions` in lexicographic producer-name order.
///
/// Every aggregate the engine computes walks decisions in this order, which is
/// what makes results independent of input ordering.
pub fn canonical_order(decisions: &[AgentDecision]) -> Vec<&AgentDecision> {
    let mut ordered: Vec<&AgentDecision> = decisions.iter().collect();
    ordered.sort_by(|a, b| a.producer.cmp(&b.producer));
    ordered
}
