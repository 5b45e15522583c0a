//! The serializable escalation payload handed to a downstream review system.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alignment::summary::AlignmentState;
use crate::domain::decision::AgentDecision;

/// Why a request for human review was raised.
///
/// Only `HardDisagreement` is emitted today. The other reasons are reserved
/// for triggers that are not wired yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    HardDisagreement,
    LowConfidence,
    InconsistentEvidence,
    CustomRule,
}

impl EscalationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HardDisagreement => "hard_disagreement",
            Self::LowConfidence => "low_confidence",
            Self::InconsistentEvidence => "inconsistent_evidence",
            Self::CustomRule => "custom_rule",
        }
    }
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied inputs to the contract builder that the engine must not
/// invent: the logical timestamp and any processing context to pass along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationContext {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub processing_context: BTreeMap<String, serde_json::Value>,
}

impl EscalationContext {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            processing_context: BTreeMap::new(),
        }
    }

    /// Add one processing-context entry (builder pattern).
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.processing_context.insert(key.into(), value);
        self
    }
}

/// Self-contained request for human adjudication.
///
/// Contains no callables, handles or sampled values; serializing and
/// deserializing it reproduces an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitlRequest {
    /// Content-derived id: identical inputs always yield the same id.
    pub request_id: String,
    pub task_id: String,
    pub alignment_state: AlignmentState,
    pub alignment_score: f64,
    pub escalation_reason: EscalationReason,
    /// Short deterministic explanation for the reviewer.
    pub summary: String,
    pub dissenting_agents: Vec<String>,
    /// Full copies of every decision, so reviewers need no other context.
    pub agent_decisions: Vec<AgentDecision>,
    pub created_at: DateTime<Utc>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_reason_wire_names() {
        for reason in [
            EscalationReason::HardDisagreement,
            EscalationReason::LowConfidence,
            EscalationReason::InconsistentEvidence,
            EscalationReason::CustomRule,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{reason}\""));
            let back: EscalationReason = serde_json::from_str(&json).unwrap();
            assert_eq!(back, reason);
        }
    }

    #[test]
    fn test_context_builder() {
        let ctx = EscalationContext::new(Utc::now())
            .with_context("pipeline", serde_json::json!("nightly"))
            .with_context("batch", serde_json::json!(7));
        assert_eq!(ctx.processing_context.len(), 2);
        assert_eq!(ctx.processing_context["batch"], serde_json::json!(7));
    }
}
