//! HITL contract builder: decide whether to escalate and build the payload.
//!
//! Two terminal outcomes: escalate (a [`HitlRequest`]) or not (`None`). The
//! only trigger is a hard disagreement. Insufficient signal and soft
//! disagreement never escalate; callers treat the result as final.

use serde_json::json;

use super::request::{EscalationContext, EscalationReason, HitlRequest};
use crate::alignment::summary::AlignmentSummary;
use crate::domain::decision::{canonical_order, AgentDecision};
use crate::domain::digest::compute_digest;
use crate::domain::error::Result;
use crate::resolution::EvaluationResult;

/// Hex characters of the content digest kept in a request id.
const REQUEST_ID_DIGEST_LEN: usize = 16;

/// Build an escalation request when `summary` is a hard disagreement.
///
/// Pure: `result` is not modified and nothing is sampled. `created_at` and
/// any processing context come from `context`.
pub fn build_hitl_request(
    result: &EvaluationResult,
    summary: &AlignmentSummary,
    context: &EscalationContext,
) -> Result<Option<HitlRequest>> {
    if !summary.requires_escalation() {
        return Ok(None);
    }

    let request_id = derive_request_id(&result.task_id, &result.agent_decisions)?;

    // Derived keys are inserted last so caller context can never shadow them.
    let mut metadata = context.processing_context.clone();
    metadata.insert("confidence_spread".into(), json!(summary.confidence_spread));
    metadata.insert("avg_confidence".into(), json!(summary.avg_confidence));
    metadata.insert(
        "disagreement_areas".into(),
        json!(summary.disagreement_areas),
    );
    metadata.insert(
        "consensus_strength".into(),
        json!(summary.consensus_strength),
    );
    metadata.insert(
        "resolution_rationale".into(),
        json!(summary.resolution_rationale),
    );
    metadata.insert("agent_count".into(), json!(result.agent_decisions.len()));
    metadata.insert(
        "synthesized_decision".into(),
        json!(result.synthesized_decision),
    );
    metadata.insert("resolved_confidence".into(), json!(result.confidence));

    Ok(Some(HitlRequest {
        request_id,
        task_id: result.task_id.clone(),
        alignment_state: summary.state,
        alignment_score: summary.alignment_score,
        escalation_reason: EscalationReason::HardDisagreement,
        summary: escalation_summary(summary, result.agent_decisions.len()),
        dissenting_agents: summary.dissenting_agents.clone(),
        agent_decisions: result.agent_decisions.clone(),
        created_at: context.created_at,
        metadata,
    }))
}

/// Deterministic request id: `hitl-<task_id>-<digest prefix>`.
///
/// The digest covers the task id and every `(producer, decision_value,
/// confidence)` triple sorted by producer, so re-submitting the same
/// disagreement always yields the same id.
pub fn derive_request_id(task_id: &str, decisions: &[AgentDecision]) -> Result<String> {
    let triples: Vec<serde_json::Value> = canonical_order(decisions)
        .into_iter()
        .map(|d| json!([d.producer, d.decision_value, d.confidence]))
        .collect();
    let digest = compute_digest(&json!({ "task_id": task_id, "decisions": triples }))?;
    Ok(format!("hitl-{task_id}-{}", &digest[..REQUEST_ID_DIGEST_LEN]))
}

fn escalation_summary(summary: &AlignmentSummary, total: usize) -> String {
    format!(
        "Agents fundamentally disagree on decision ({}/{} dissenting, confidence spread: {:.2})",
        summary.dissenting_agents.len(),
        total,
        summary.confidence_spread
    )
}
