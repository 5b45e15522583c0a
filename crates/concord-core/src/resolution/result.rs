//! The immutable outcome of one evaluation.

use serde::{Deserialize, Serialize};

use super::resolver::Resolution;
use crate::alignment::summary::AlignmentSummary;
use crate::domain::decision::{canonical_order, AgentDecision};
use crate::domain::schema::DecisionValue;

/// Final result of reconciling one task's decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub task_id: String,
    pub synthesized_decision: DecisionValue,
    pub confidence: f64,
    pub reasoning: String,
    pub evidence: Vec<String>,
    /// Derived solely from `alignment_summary.state == HardDisagreement`.
    pub requires_human_review: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<String>,
    pub alignment_summary: AlignmentSummary,
    /// Verbatim input decisions, in producer-name order.
    pub agent_decisions: Vec<AgentDecision>,
}

impl EvaluationResult {
    /// Combine the analyzer and resolver outputs into the final result.
    pub fn assemble(
        task_id: impl Into<String>,
        decisions: &[AgentDecision],
        summary: AlignmentSummary,
        resolution: Resolution,
    ) -> Self {
        let requires_human_review = summary.requires_escalation();
        let review_reason = requires_human_review
            .then(|| "Agents have fundamental disagreements requiring human review".to_string());

        Self {
            task_id: task_id.into(),
            synthesized_decision: resolution.decision_value,
            confidence: resolution.confidence,
            reasoning: resolution.reasoning,
            evidence: resolution.evidence,
            requires_human_review,
            review_reason,
            alignment_summary: summary,
            agent_decisions: canonical_order(decisions).into_iter().cloned().collect(),
        }
    }
}
