//! Structured observability hooks for evaluations.
//!
//! This module provides:
//! - Task-scoped tracing spans via the `EvaluationSpan` RAII guard
//! - Emission functions that turn [`DecisionPoint`]s and escalation outcomes
//!   into `tracing` events
//!
//! Nothing else in the crate logs; the engine stays pure and callers decide
//! whether to observe it.

use tracing::{info, warn};

use crate::hitl::request::HitlRequest;
use crate::trace::DecisionPoint;

/// RAII guard that enters a task-scoped span for the duration of an evaluation.
///
/// ```ignore
/// let _span = EvaluationSpan::enter("task-42");
/// // every event below carries task_id = "task-42"
/// ```
pub struct EvaluationSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvaluationSpan {
    pub fn enter(task_id: &str) -> Self {
        let span = tracing::info_span!("concord.evaluation", task_id = %task_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit one decision point as an `info!` event.
pub fn emit_decision_point(point: &DecisionPoint) {
    let event = point.event_name();
    match point {
        DecisionPoint::AlignmentClassified {
            state,
            rule,
            avg_confidence,
            confidence_spread,
            agent_count,
        } => info!(
            event = event,
            state = %state,
            rule = ?rule,
            avg_confidence = *avg_confidence,
            confidence_spread = *confidence_spread,
            agent_count = *agent_count,
        ),
        DecisionPoint::PluralitySelected {
            value,
            group_size,
            total,
            group_count,
            tie_broken,
        } => info!(
            event = event,
            value = %value,
            group_size = *group_size,
            total = *total,
            group_count = *group_count,
            tie_broken = *tie_broken,
        ),
        DecisionPoint::ConfidenceResolved { policy, confidence } => {
            info!(event = event, policy = ?policy, confidence = *confidence)
        }
        DecisionPoint::EscalationEvaluated {
            escalate,
            reason,
            request_id,
        } => info!(
            event = event,
            escalate = *escalate,
            reason = reason.map(|r| r.as_str()).unwrap_or("none"),
            request_id = request_id.as_deref().unwrap_or(""),
        ),
    }
}

pub fn emit_decision_points(points: &[DecisionPoint]) {
    points.iter().for_each(emit_decision_point);
}

/// Emit event: a HITL request was produced (warning level, it needs a human).
pub fn emit_escalation(request: &HitlRequest) {
    warn!(
        event = "hitl.requested",
        request_id = %request.request_id,
        reason = %request.escalation_reason,
        dissenting = request.dissenting_agents.len(),
        alignment_score = request.alignment_score,
    );
}

/// Emit event: a received HITL request failed contract validation.
pub fn emit_contract_violation(request_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "hitl.contract_violation", request_id = %request_id, error = %error);
}
