//! Contract checks for [`HitlRequest`] payloads and the published escalation
//! semantics consumers can rely on.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::builder::derive_request_id;
use super::request::{EscalationReason, HitlRequest};
use crate::alignment::summary::AlignmentState;
use crate::domain::error::{ConcordError, Result};

pub const CONTRACT_VERSION: &str = "1.0.0";

/// Validate a request received over the wire, e.g. before a review queue
/// accepts it.
///
/// # Errors
///
/// `ContractViolation` naming the first failed check.
pub fn validate_hitl_request(request: &HitlRequest) -> Result<()> {
    for (field, value) in [
        ("request_id", &request.request_id),
        ("task_id", &request.task_id),
        ("summary", &request.summary),
    ] {
        if value.trim().is_empty() {
            return Err(violation(format!("{field} must not be blank")));
        }
    }

    if !request.alignment_score.is_finite() || !(0.0..=1.0).contains(&request.alignment_score) {
        return Err(violation(format!(
            "alignment_score {} outside [0, 1]",
            request.alignment_score
        )));
    }

    if request.agent_decisions.is_empty() {
        return Err(violation("agent_decisions is empty"));
    }

    let mut producers = BTreeSet::new();
    for d in &request.agent_decisions {
        if d.producer.trim().is_empty() {
            return Err(violation("agent decision with a blank producer"));
        }
        if !producers.insert(d.producer.as_str()) {
            return Err(violation(format!("duplicate producer {}", d.producer)));
        }
    }

    if let Some(unknown) = request
        .dissenting_agents
        .iter()
        .find(|name| !producers.contains(name.as_str()))
    {
        return Err(violation(format!(
            "dissenting agent {unknown} has no decision in the request"
        )));
    }

    if request.escalation_reason == EscalationReason::HardDisagreement
        && request.alignment_state != AlignmentState::HardDisagreement
    {
        return Err(violation(format!(
            "reason hard_disagreement with alignment_state {}",
            request.alignment_state
        )));
    }

    let expected = derive_request_id(&request.task_id, &request.agent_decisions)?;
    if request.request_id != expected {
        return Err(violation(format!(
            "request_id {} does not match payload (expected {expected})",
            request.request_id
        )));
    }

    Ok(())
}

fn violation(detail: impl Into<String>) -> ConcordError {
    ConcordError::ContractViolation(detail.into())
}

/// One escalation trigger and the conditions under which it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationTrigger {
    pub reason: EscalationReason,
    pub description: String,
    pub conditions: Vec<String>,
    /// `true` when the engine raises this trigger on its own.
    pub automatic: bool,
}

/// Machine-readable description of the escalation contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationSemantics {
    pub contract_version: String,
    pub deterministic: bool,
    pub side_effects: bool,
    pub triggers: Vec<EscalationTrigger>,
    pub included_information: Vec<String>,
    pub excluded_information: Vec<String>,
}

pub fn escalation_semantics() -> EscalationSemantics {
    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    EscalationSemantics {
        contract_version: CONTRACT_VERSION.to_string(),
        deterministic: true,
        side_effects: false,
        triggers: vec![
            EscalationTrigger {
                reason: EscalationReason::HardDisagreement,
                description: "Agents disagree on the primary decision".into(),
                conditions: strings(&[
                    "alignment_state == hard_disagreement",
                    "decision_agreement == false",
                ]),
                automatic: true,
            },
            EscalationTrigger {
                reason: EscalationReason::LowConfidence,
                description: "Confidence too low to act on".into(),
                conditions: strings(&["reserved; insufficient_signal does not escalate"]),
                automatic: false,
            },
            EscalationTrigger {
                reason: EscalationReason::InconsistentEvidence,
                description: "Evidence contradicts the synthesized decision".into(),
                conditions: strings(&["reserved"]),
                automatic: false,
            },
            EscalationTrigger {
                reason: EscalationReason::CustomRule,
                description: "Caller-defined escalation rule".into(),
                conditions: strings(&["reserved"]),
                automatic: false,
            },
        ],
        included_information: strings(&[
            "request_id",
            "task_id",
            "alignment_state",
            "alignment_score",
            "escalation_reason",
            "summary",
            "dissenting_agents",
            "agent_decisions",
            "created_at",
            "metadata",
        ]),
        excluded_information: strings(&[
            "callables",
            "runtime handles",
            "wall-clock or random values",
            "downstream routing",
        ]),
    }
}
