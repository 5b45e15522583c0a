//! Disagreement resolver: synthesize one decision from many.
//!
//! **Policy:**
//! - Agreement → the common value at `avg_confidence`.
//! - Value conflict that is not a hard disagreement → plurality value at
//!   `consensus_strength * avg_confidence`.
//! - Hard disagreement → plurality value, confidence capped at
//!   [`HARD_DISAGREEMENT_CONFIDENCE_CAP`], pending human review.

use serde::{Deserialize, Serialize};

use crate::alignment::analyzer::{check_decisions, plurality};
use crate::alignment::summary::{AlignmentState, AlignmentSummary};
use crate::domain::decision::{canonical_order, AgentDecision};
use crate::domain::error::{ConcordError, Result};
use crate::domain::schema::{DecisionSchema, DecisionValue};

/// Upper bound on resolved confidence while a human review is pending.
pub const HARD_DISAGREEMENT_CONFIDENCE_CAP: f64 = 0.5;

/// Which confidence policy produced the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    Unanimous,
    WeightedPlurality,
    ClampedPlurality,
}

/// Synthesized decision for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub decision_value: DecisionValue,
    pub confidence: f64,
    pub reasoning: String,
    /// Union of producer evidence, first appearance kept.
    pub evidence: Vec<String>,
    pub policy: ResolutionPolicy,
}

/// Resolve `decisions` against the summary the analyzer produced for them.
///
/// # Errors
///
/// `EmptyDecisionSet`, `DuplicateProducer`, `InvalidConfidence` or
/// `SchemaViolation` when the decisions do not fit `schema`.
pub fn resolve(
    decisions: &[AgentDecision],
    summary: &AlignmentSummary,
    schema: &DecisionSchema,
) -> Result<Resolution> {
    check_decisions(decisions, schema)?;

    let ordered = canonical_order(decisions);
    let winner = plurality(&ordered, schema);
    if !schema.values_equal(&winner.value, &summary.plurality_value) {
        return Err(ConcordError::SchemaViolation {
            producer: winner.members.first().cloned().unwrap_or_default(),
            detail: format!(
                "summary plurality {} does not match decisions (plurality {})",
                summary.plurality_value, winner.value
            ),
        });
    }

    let weighted = summary.consensus_strength * summary.avg_confidence;
    let (confidence, policy) = if summary.decision_agreement {
        (summary.avg_confidence, ResolutionPolicy::Unanimous)
    } else if summary.state == AlignmentState::HardDisagreement {
        (
            weighted.min(HARD_DISAGREEMENT_CONFIDENCE_CAP),
            ResolutionPolicy::ClampedPlurality,
        )
    } else {
        (weighted, ResolutionPolicy::WeightedPlurality)
    };

    let rendered = schema.render(&winner.value);
    let total = ordered.len();
    let reasoning = if summary.decision_agreement {
        format!(
            "{total} of {total} producers agree on {rendered}; unanimous at {:.2}",
            summary.avg_confidence
        )
    } else {
        let mut text = format!(
            "{} of {total} producers agree on {rendered}; dissenting: {}",
            winner.members.len(),
            summary.dissenting_agents.join(", ")
        );
        if policy == ResolutionPolicy::ClampedPlurality {
            text.push_str("; pending human review");
        }
        text
    };

    Ok(Resolution {
        decision_value: winner.value,
        confidence,
        reasoning,
        evidence: merge_evidence(&ordered),
        policy,
    })
}

/// Union of evidence lists in producer-name order. Exact-text duplicates and
/// blank items are dropped.
fn merge_evidence(ordered: &[&AgentDecision]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for item in ordered.iter().flat_map(|d| d.evidence.iter()) {
        if item.trim().is_empty() || merged.contains(item) {
            continue;
        }
        merged.push(item.clone());
    }
    merged
}
