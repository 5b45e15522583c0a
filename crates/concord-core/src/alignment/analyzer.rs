//! Alignment analyzer: decisions + thresholds → [`AlignmentSummary`].
//!
//! Every aggregate walks decisions in producer-name order, so any permutation
//! of the same decisions yields a field-for-field identical summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::summary::{AlignmentState, AlignmentSummary, DisagreementArea};
use super::thresholds::AlignmentThresholds;
use crate::domain::decision::{canonical_order, AgentDecision};
use crate::domain::error::{ConcordError, Result};
use crate::domain::schema::{DecisionSchema, DecisionValue};

const AGREEMENT_WEIGHT: f64 = 0.4;
const CONSISTENCY_WEIGHT: f64 = 0.3;
const CONSENSUS_WEIGHT: f64 = 0.3;

/// The winning value group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plurality {
    /// Value of the lexicographically first producer in the winning group.
    pub value: DecisionValue,
    /// Producers in the winning group, sorted.
    pub members: Vec<String>,
    /// Number of distinct value groups.
    pub group_count: usize,
    /// `true` when another group had the same size and the name tie-break decided.
    pub tie_broken: bool,
}

/// Which classification branch fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    /// Average below the floor with spread below the ceiling.
    UniformLowConfidence,
    /// Any value conflict (value-conflict predicate).
    ValueConflict,
    /// Value conflict accompanied by a confidence spread above the soft threshold.
    ValueConflictWithSpread,
    /// Value conflict that did not pass the hard predicate.
    ValueConflictBelowHardGate,
    /// Same value, confidences diverge.
    ConfidenceSpread,
    /// Same value, spread within bounds.
    WithinBounds,
}

/// Summary plus the intermediate decisions that led to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub summary: AlignmentSummary,
    pub plurality: Plurality,
    pub rule: ClassificationRule,
}

/// Analyze alignment across `decisions`.
///
/// # Errors
///
/// Fails fast, before any classification, with `InvalidSchema`,
/// `InvalidThresholds`, `EmptyDecisionSet`, `InvalidDecision` (blank
/// producer), `DuplicateProducer`,
/// `InvalidConfidence` or `SchemaViolation`.
pub fn analyze(
    decisions: &[AgentDecision],
    schema: &DecisionSchema,
    thresholds: &AlignmentThresholds,
) -> Result<AlignmentSummary> {
    analyze_detailed(decisions, schema, thresholds).map(|a| a.summary)
}

/// Like [`analyze`] but also returns the plurality outcome and the rule that fired.
pub fn analyze_detailed(
    decisions: &[AgentDecision],
    schema: &DecisionSchema,
    thresholds: &AlignmentThresholds,
) -> Result<Analysis> {
    schema.check()?;
    thresholds.validate()?;
    check_decisions(decisions, schema)?;

    let ordered = canonical_order(decisions);
    let plurality = plurality(&ordered, schema);
    let total = ordered.len();

    let decision_agreement = plurality.group_count == 1;
    let avg_confidence = ordered.iter().map(|d| d.confidence).sum::<f64>() / total as f64;
    let (lo, hi) = ordered
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d.confidence), hi.max(d.confidence))
        });
    let confidence_spread = hi - lo;
    let consensus_strength = plurality.members.len() as f64 / total as f64;

    let dissenting_agents: Vec<String> = ordered
        .iter()
        .filter(|d| !plurality.members.contains(&d.producer))
        .map(|d| d.producer.clone())
        .collect();

    let mut disagreement_areas = Vec::new();
    if !decision_agreement {
        disagreement_areas.push(DisagreementArea::PrimaryDecision);
    }
    if confidence_spread > thresholds.soft_disagreement_spread {
        disagreement_areas.push(DisagreementArea::ConfidenceLevels);
    }

    let (state, rule) = classify(
        decision_agreement,
        avg_confidence,
        confidence_spread,
        thresholds,
    );

    let alignment_score = alignment_score(decision_agreement, confidence_spread, consensus_strength);
    let resolution_rationale =
        rationale(state, avg_confidence, confidence_spread, &disagreement_areas);

    let confidence_distribution: BTreeMap<String, f64> = ordered
        .iter()
        .map(|d| (d.producer.clone(), d.confidence))
        .collect();

    let summary = AlignmentSummary {
        state,
        alignment_score,
        decision_agreement,
        plurality_value: plurality.value.clone(),
        confidence_spread,
        avg_confidence,
        confidence_distribution,
        dissenting_agents,
        disagreement_areas,
        consensus_strength,
        resolution_rationale,
    };

    Ok(Analysis {
        summary,
        plurality,
        rule,
    })
}

/// Precondition checks shared by the analyzer and the resolver.
pub(crate) fn check_decisions(decisions: &[AgentDecision], schema: &DecisionSchema) -> Result<()> {
    if decisions.is_empty() {
        return Err(ConcordError::EmptyDecisionSet);
    }

    if let Some(d) = decisions.iter().find(|d| d.producer.trim().is_empty()) {
        return Err(ConcordError::InvalidDecision {
            detail: format!("producer name must not be blank (got {:?})", d.producer),
        });
    }

    let ordered = canonical_order(decisions);
    if let Some(pair) = ordered.windows(2).find(|w| w[0].producer == w[1].producer) {
        return Err(ConcordError::DuplicateProducer {
            producer: pair[0].producer.clone(),
        });
    }

    for d in &ordered {
        if !d.confidence.is_finite() || !(0.0..=1.0).contains(&d.confidence) {
            return Err(ConcordError::InvalidConfidence {
                detail: format!(
                    "{} reported {}, expected a normalized value in [0, 1]",
                    d.producer, d.confidence
                ),
            });
        }
    }

    for d in &ordered {
        if let Some(detail) = schema.violation(&d.decision_value) {
            return Err(ConcordError::SchemaViolation {
                producer: d.producer.clone(),
                detail,
            });
        }
    }
    Ok(())
}

/// Group decisions (already in canonical order) by schema equality and pick
/// the largest group. Ties go to the group whose first member sorts first,
/// which is the earliest group formed.
pub(crate) fn plurality(ordered: &[&AgentDecision], schema: &DecisionSchema) -> Plurality {
    let mut groups: Vec<(&DecisionValue, Vec<String>)> = Vec::new();
    for d in ordered {
        match groups
            .iter_mut()
            .find(|(rep, _)| schema.values_equal(rep, &d.decision_value))
        {
            Some((_, members)) => members.push(d.producer.clone()),
            None => groups.push((&d.decision_value, vec![d.producer.clone()])),
        }
    }

    let max = groups.iter().map(|(_, m)| m.len()).max().unwrap_or(0);
    let tied = groups.iter().filter(|(_, m)| m.len() == max).count();
    let group_count = groups.len();

    let (value, members) = groups
        .into_iter()
        .find(|(_, m)| m.len() == max)
        .map(|(v, m)| (v.clone(), m))
        .unwrap_or((DecisionValue::Bool(false), Vec::new()));

    Plurality {
        value,
        members,
        group_count,
        tie_broken: tied > 1,
    }
}

/// Classification in fixed priority order; the first match wins.
pub fn classify(
    decision_agreement: bool,
    avg_confidence: f64,
    confidence_spread: f64,
    thresholds: &AlignmentThresholds,
) -> (AlignmentState, ClassificationRule) {
    let spread_diverges = confidence_spread > thresholds.soft_disagreement_spread;

    if avg_confidence < thresholds.insufficient_signal_confidence_floor
        && confidence_spread < thresholds.insufficient_signal_spread_ceiling
    {
        return (
            AlignmentState::InsufficientSignal,
            ClassificationRule::UniformLowConfidence,
        );
    }

    if !decision_agreement {
        if thresholds.hard_disagreement_requires_value_conflict {
            return (
                AlignmentState::HardDisagreement,
                ClassificationRule::ValueConflict,
            );
        }
        if spread_diverges {
            return (
                AlignmentState::HardDisagreement,
                ClassificationRule::ValueConflictWithSpread,
            );
        }
        return (
            AlignmentState::SoftDisagreement,
            ClassificationRule::ValueConflictBelowHardGate,
        );
    }

    if spread_diverges {
        return (
            AlignmentState::SoftDisagreement,
            ClassificationRule::ConfidenceSpread,
        );
    }

    (
        AlignmentState::FullAlignment,
        ClassificationRule::WithinBounds,
    )
}

fn alignment_score(decision_agreement: bool, spread: f64, consensus_strength: f64) -> f64 {
    let agreement = if decision_agreement { 1.0 } else { 0.0 };
    let score = AGREEMENT_WEIGHT * agreement
        + CONSISTENCY_WEIGHT * (1.0 - spread)
        + CONSENSUS_WEIGHT * consensus_strength;
    score.clamp(0.0, 1.0)
}

fn rationale(
    state: AlignmentState,
    avg_confidence: f64,
    spread: f64,
    areas: &[DisagreementArea],
) -> String {
    match state {
        AlignmentState::FullAlignment => format!(
            "Full alignment: agents agree on decision with avg confidence {avg_confidence:.2}"
        ),
        AlignmentState::SoftDisagreement => {
            let areas = areas
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("Soft disagreement in {areas} (spread: {spread:.2})")
        }
        AlignmentState::HardDisagreement => {
            "Hard disagreement: agents disagree on primary decision".to_string()
        }
        AlignmentState::InsufficientSignal => format!(
            "Insufficient signal: low average confidence ({avg_confidence:.2})"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> AlignmentThresholds {
        AlignmentThresholds::new(0.2, true, 0.5, 0.2)
    }

    fn boolean(name: &str, value: bool, confidence: f64) -> AgentDecision {
        AgentDecision::new(name, "agent", value, confidence)
    }

    #[test]
    fn test_empty_decision_set_is_rejected() {
        let err = analyze(&[], &DecisionSchema::boolean(), &thresholds()).unwrap_err();
        assert!(matches!(err, ConcordError::EmptyDecisionSet));
    }

    #[test]
    fn test_duplicate_producer_is_rejected() {
        let decisions = vec![boolean("judge", true, 0.9), boolean("judge", false, 0.8)];
        let err = analyze(&decisions, &DecisionSchema::boolean(), &thresholds()).unwrap_err();
        assert!(matches!(err, ConcordError::DuplicateProducer { producer } if producer == "judge"));
    }

    #[test]
    fn test_schema_violation_fails_before_classification() {
        let decisions = vec![
            AgentDecision::new("a", "agent", "huge", 0.9),
            AgentDecision::new("b", "agent", "low", 0.9),
        ];
        let schema = DecisionSchema::categorical(["low", "medium", "high"]);
        let err = analyze(&decisions, &schema, &thresholds()).unwrap_err();
        assert!(matches!(err, ConcordError::SchemaViolation { producer, .. } if producer == "a"));
    }

    #[test]
    fn test_unnormalized_confidence_is_rejected() {
        let decisions = vec![boolean("a", true, 1.2)];
        let err = analyze(&decisions, &DecisionSchema::boolean(), &thresholds()).unwrap_err();
        assert!(matches!(err, ConcordError::InvalidConfidence { .. }));
    }

    #[test]
    fn test_blank_producer_is_rejected() {
        for name in ["", "   "] {
            let decisions = vec![boolean("a", true, 0.9), boolean(name, false, 0.8)];
            let err = analyze(&decisions, &DecisionSchema::boolean(), &thresholds()).unwrap_err();
            assert!(matches!(err, ConcordError::InvalidDecision { .. }), "{name:?}");
        }
    }

    #[test]
    fn test_malformed_schema_is_rejected_by_analyze() {
        let decisions = vec![AgentDecision::new("a", "agent", "low", 0.9)];
        let schema = DecisionSchema::categorical(Vec::<String>::new());
        let err = analyze(&decisions, &schema, &thresholds()).unwrap_err();
        assert!(matches!(err, ConcordError::InvalidSchema(_)));
    }

    #[test]
    fn test_invalid_thresholds_reported_before_decision_errors() {
        let t = AlignmentThresholds::new(1.5, true, 0.5, 0.2);
        let valid = vec![boolean("a", true, 0.9)];
        let err = analyze(&valid, &DecisionSchema::boolean(), &t).unwrap_err();
        assert!(matches!(err, ConcordError::InvalidThresholds(_)));

        // Empty and unnormalized decisions still surface the threshold error first.
        let err = analyze(&[], &DecisionSchema::boolean(), &t).unwrap_err();
        assert!(matches!(err, ConcordError::InvalidThresholds(_)));
        let bad = vec![boolean("a", true, 3.0)];
        let err = analyze(&bad, &DecisionSchema::boolean(), &t).unwrap_err();
        assert!(matches!(err, ConcordError::InvalidThresholds(_)));
    }

    #[test]
    fn test_schema_checked_before_thresholds() {
        let t = AlignmentThresholds::new(1.5, true, 0.5, 0.2);
        let schema = DecisionSchema::scalar(5.0, 1.0);
        let err = analyze(&[boolean("a", true, 0.9)], &schema, &t).unwrap_err();
        assert!(matches!(err, ConcordError::InvalidSchema(_)));
    }

    #[test]
    fn test_plurality_tie_goes_to_first_producer_name() {
        let decisions = vec![
            boolean("zeta", true, 0.9),
            boolean("alpha", false, 0.9),
            boolean("mu", true, 0.9),
            boolean("beta", false, 0.9),
        ];
        let ordered = canonical_order(&decisions);
        let p = plurality(&ordered, &DecisionSchema::boolean());
        assert_eq!(p.value, DecisionValue::Bool(false));
        assert_eq!(p.members, vec!["alpha", "beta"]);
        assert!(p.tie_broken);
        assert_eq!(p.group_count, 2);
    }

    #[test]
    fn test_single_decision_is_full_alignment() {
        let summary = analyze(
            &[boolean("solo", true, 0.8)],
            &DecisionSchema::boolean(),
            &thresholds(),
        )
        .unwrap();
        assert_eq!(summary.state, AlignmentState::FullAlignment);
        assert_eq!(summary.confidence_spread, 0.0);
        assert_eq!(summary.consensus_strength, 1.0);
    }

    #[test]
    fn test_classify_priority_order() {
        let t = thresholds();
        assert_eq!(
            classify(false, 0.3, 0.1, &t),
            (
                AlignmentState::InsufficientSignal,
                ClassificationRule::UniformLowConfidence
            )
        );
        // Low average but widely spread confidence is not "uniformly unsure".
        assert_eq!(classify(false, 0.3, 0.4, &t).0, AlignmentState::HardDisagreement);
        assert_eq!(
            classify(true, 0.8, 0.3, &t),
            (
                AlignmentState::SoftDisagreement,
                ClassificationRule::ConfidenceSpread
            )
        );
        assert_eq!(
            classify(true, 0.8, 0.2, &t),
            (AlignmentState::FullAlignment, ClassificationRule::WithinBounds)
        );
    }

    #[test]
    fn test_classify_hard_gate_with_spread_requirement() {
        let t = AlignmentThresholds::new(0.2, false, 0.5, 0.2);
        assert_eq!(
            classify(false, 0.8, 0.05, &t),
            (
                AlignmentState::SoftDisagreement,
                ClassificationRule::ValueConflictBelowHardGate
            )
        );
        assert_eq!(
            classify(false, 0.8, 0.3, &t),
            (
                AlignmentState::HardDisagreement,
                ClassificationRule::ValueConflictWithSpread
            )
        );
    }

    #[test]
    fn test_alignment_score_weights() {
        assert!((alignment_score(true, 0.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((alignment_score(false, 1.0, 0.0) - 0.0).abs() < 1e-12);
        assert!((alignment_score(false, 0.2, 0.5) - (0.3 * 0.8 + 0.3 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_disagreement_areas_order() {
        let decisions = vec![boolean("a", true, 0.95), boolean("b", false, 0.6)];
        let summary = analyze(&decisions, &DecisionSchema::boolean(), &thresholds()).unwrap();
        assert_eq!(
            summary.disagreement_areas,
            vec![
                DisagreementArea::PrimaryDecision,
                DisagreementArea::ConfidenceLevels
            ]
        );
    }
}
