//! On-disk input format for `concord evaluate` and `concord analyze`.
//!
//! ```json
//! {
//!   "task_id": "match-001",
//!   "schema": { "type": "boolean", "positive_label": "match", "negative_label": "no_match" },
//!   "decisions": [
//!     { "producer": "advocate", "role": "advocate", "decision_value": true, "confidence": "0.9" }
//!   ],
//!   "context": { "pipeline": "nightly" },
//!   "created_at": "2026-10-18T09:00:00Z"
//! }
//! ```
//!
//! Confidence is accepted raw (number or numeric string) and normalized
//! through the schema before it reaches the engine.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use concord_core::{AgentDecision, DecisionSchema, DecisionValue, EscalationContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub task_id: String,
    pub schema: DecisionSchema,
    pub decisions: Vec<RawDecision>,
    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A decision as a producer reported it, before confidence normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDecision {
    pub producer: String,
    #[serde(default)]
    pub role: String,
    pub decision_value: DecisionValue,
    pub confidence: serde_json::Value,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl EvaluationInput {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid input JSON in {:?}", path))
    }

    /// Decisions with confidence normalized through the schema.
    pub fn decisions(&self) -> Result<Vec<AgentDecision>> {
        self.decisions
            .iter()
            .map(|raw| {
                let confidence = self
                    .schema
                    .normalize_confidence(&raw.confidence)
                    .with_context(|| format!("Bad confidence from producer {}", raw.producer))?;
                Ok(AgentDecision {
                    producer: raw.producer.clone(),
                    role: raw.role.clone(),
                    decision_value: raw.decision_value.clone(),
                    confidence,
                    rationale: raw.rationale.clone(),
                    evidence: raw.evidence.clone(),
                })
            })
            .collect()
    }

    /// Escalation context. `created_at` precedence: explicit override, then
    /// the input file, then `fallback`.
    pub fn escalation_context(
        &self,
        created_at: Option<DateTime<Utc>>,
        fallback: impl FnOnce() -> DateTime<Utc>,
    ) -> EscalationContext {
        let created_at = created_at.or(self.created_at).unwrap_or_else(fallback);
        let mut ctx = EscalationContext::new(created_at);
        ctx.processing_context = self.context.clone();
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const INPUT: &str = r#"{
        "task_id": "match-001",
        "schema": { "type": "categorical", "categories": ["low", "medium", "high"] },
        "decisions": [
            { "producer": "a", "role": "rater", "decision_value": "high", "confidence": "0.9" },
            { "producer": "b", "decision_value": "low", "confidence": 1.7, "evidence": ["log"] }
        ],
        "context": { "attempt": 2 }
    }"#;

    #[test]
    fn test_raw_confidence_is_normalized() {
        let input: EvaluationInput = serde_json::from_str(INPUT).unwrap();
        let decisions = input.decisions().unwrap();
        assert_eq!(decisions[0].confidence, 0.9);
        assert_eq!(decisions[1].confidence, 1.0);
        assert_eq!(decisions[1].role, "");
        assert_eq!(decisions[1].evidence, vec!["log"]);
    }

    #[test]
    fn test_non_numeric_confidence_names_producer() {
        let mut input: EvaluationInput = serde_json::from_str(INPUT).unwrap();
        input.decisions[1].confidence = serde_json::json!("very sure");
        let err = input.decisions().unwrap_err();
        assert!(format!("{err:#}").contains("producer b"));
    }

    #[test]
    fn test_created_at_precedence() {
        let mut input: EvaluationInput = serde_json::from_str(INPUT).unwrap();
        let file_time = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let flag_time = Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap();
        let fallback = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap();

        assert_eq!(input.escalation_context(None, || fallback).created_at, fallback);
        input.created_at = Some(file_time);
        assert_eq!(input.escalation_context(None, || fallback).created_at, file_time);
        let ctx = input.escalation_context(Some(flag_time), || fallback);
        assert_eq!(ctx.created_at, flag_time);
        assert_eq!(ctx.processing_context["attempt"], serde_json::json!(2));
    }

    #[test]
    fn test_read_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = EvaluationInput::read(&path).unwrap_err();
        assert!(err.to_string().contains("input.json"));
    }
}
