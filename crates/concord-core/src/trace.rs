//! Decision points: serializable records of what the engine decided, in the
//! order it decided them.
//!
//! These are data, not log lines. [`crate::obs`] turns them into `tracing`
//! events; callers may also persist or diff them.

use serde::{Deserialize, Serialize};

use crate::alignment::analyzer::ClassificationRule;
use crate::alignment::summary::AlignmentState;
use crate::domain::schema::DecisionValue;
use crate::hitl::request::EscalationReason;
use crate::resolution::resolver::ResolutionPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "point", rename_all = "snake_case")]
pub enum DecisionPoint {
    AlignmentClassified {
        state: AlignmentState,
        rule: ClassificationRule,
        avg_confidence: f64,
        confidence_spread: f64,
        agent_count: usize,
    },
    PluralitySelected {
        value: DecisionValue,
        group_size: usize,
        total: usize,
        group_count: usize,
        tie_broken: bool,
    },
    ConfidenceResolved {
        policy: ResolutionPolicy,
        confidence: f64,
    },
    EscalationEvaluated {
        escalate: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<EscalationReason>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl DecisionPoint {
    /// Dotted event name used by the observer layer.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::AlignmentClassified { .. } => "alignment.classified",
            Self::PluralitySelected { .. } => "plurality.selected",
            Self::ConfidenceResolved { .. } => "confidence.resolved",
            Self::EscalationEvaluated { .. } => "escalation.evaluated",
        }
    }
}
