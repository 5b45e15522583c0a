//! End-to-end evaluation: analyze, resolve, assemble, then apply the
//! escalation contract.

use serde::{Deserialize, Serialize};

use crate::alignment::analyzer::analyze_detailed;
use crate::alignment::thresholds::AlignmentThresholds;
use crate::domain::decision::AgentDecision;
use crate::domain::error::{ConcordError, Result};
use crate::domain::schema::DecisionSchema;
use crate::hitl::builder::build_hitl_request;
use crate::hitl::request::{EscalationContext, HitlRequest};
use crate::resolution::resolver::resolve;
use crate::resolution::result::EvaluationResult;
use crate::trace::DecisionPoint;

/// Everything one evaluation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub result: EvaluationResult,
    pub hitl_request: Option<HitlRequest>,
    pub decision_points: Vec<DecisionPoint>,
}

impl Evaluation {
    pub fn escalated(&self) -> bool {
        self.hitl_request.is_some()
    }
}

/// Run the full pipeline for one task.
///
/// Pure and deterministic: the same inputs always give an identical
/// [`Evaluation`], regardless of the order of `decisions`.
///
/// # Errors
///
/// `BlankTaskId` when `task_id` is empty after trimming, otherwise anything
/// [`analyze_detailed`] or [`resolve`] reports.
pub fn evaluate(
    task_id: &str,
    decisions: &[AgentDecision],
    schema: &DecisionSchema,
    thresholds: &AlignmentThresholds,
    context: &EscalationContext,
) -> Result<Evaluation> {
    if task_id.trim().is_empty() {
        return Err(ConcordError::BlankTaskId);
    }
    let analysis = analyze_detailed(decisions, schema, thresholds)?;
    let summary = &analysis.summary;
    let mut points = vec![
        DecisionPoint::AlignmentClassified {
            state: summary.state,
            rule: analysis.rule,
            avg_confidence: summary.avg_confidence,
            confidence_spread: summary.confidence_spread,
            agent_count: summary.agent_count(),
        },
        DecisionPoint::PluralitySelected {
            value: analysis.plurality.value.clone(),
            group_size: analysis.plurality.members.len(),
            total: decisions.len(),
            group_count: analysis.plurality.group_count,
            tie_broken: analysis.plurality.tie_broken,
        },
    ];

    let resolution = resolve(decisions, summary, schema)?;
    points.push(DecisionPoint::ConfidenceResolved {
        policy: resolution.policy,
        confidence: resolution.confidence,
    });

    let result = EvaluationResult::assemble(task_id, decisions, analysis.summary.clone(), resolution);
    let hitl_request = build_hitl_request(&result, &analysis.summary, context)?;
    points.push(DecisionPoint::EscalationEvaluated {
        escalate: hitl_request.is_some(),
        reason: hitl_request.as_ref().map(|r| r.escalation_reason),
        request_id: hitl_request.as_ref().map(|r| r.request_id.clone()),
    });

    Ok(Evaluation {
        result,
        hitl_request,
        decision_points: points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::summary::AlignmentState;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_decision_points_follow_pipeline_order() {
        let decisions = vec![
            AgentDecision::new("a", "agent", true, 0.9),
            AgentDecision::new("b", "agent", false, 0.7),
        ];
        let ctx = EscalationContext::new(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());
        let eval = evaluate(
            "t",
            &decisions,
            &DecisionSchema::boolean(),
            &AlignmentThresholds::new(0.2, true, 0.5, 0.2),
            &ctx,
        )
        .unwrap();

        let names: Vec<_> = eval.decision_points.iter().map(|p| p.event_name()).collect();
        assert_eq!(
            names,
            vec![
                "alignment.classified",
                "plurality.selected",
                "confidence.resolved",
                "escalation.evaluated"
            ]
        );
        assert_eq!(eval.result.alignment_summary.state, AlignmentState::HardDisagreement);
        assert!(eval.escalated());
    }

    #[test]
    fn test_blank_identifiers_never_reach_the_contract() {
        let ctx = EscalationContext::new(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());
        let t = AlignmentThresholds::new(0.2, true, 0.5, 0.2);
        let schema = DecisionSchema::boolean();
        let named = vec![
            AgentDecision::new("a", "agent", true, 0.9),
            AgentDecision::new("b", "agent", false, 0.8),
        ];
        for task_id in ["", "  "] {
            let err = evaluate(task_id, &named, &schema, &t, &ctx).unwrap_err();
            assert!(matches!(err, ConcordError::BlankTaskId));
        }

        let unnamed = vec![
            AgentDecision::new("", "", true, 0.9),
            AgentDecision::new(" ", "", false, 0.8),
        ];
        let err = evaluate("t", &unnamed, &schema, &t, &ctx).unwrap_err();
        assert!(matches!(err, ConcordError::InvalidDecision { .. }));
    }
}
