//! Concord Core Library
//!
//! Deterministic reconciliation of decisions from multiple producers:
//!
//! - [`alignment`] — classify how well producers agree
//! - [`resolution`] — synthesize one decision with calibrated confidence
//! - [`hitl`] — the human-in-the-loop escalation contract
//! - [`pipeline`] — all of the above in one pure call
//! - [`trace`] / [`obs`] — decision points and their `tracing` emission

pub mod alignment;
pub mod domain;
pub mod hitl;
pub mod obs;
pub mod pipeline;
pub mod resolution;
pub mod trace;

pub use alignment::{
    analyze, analyze_detailed, classify, AlignmentState, AlignmentSummary, AlignmentThresholds,
    Analysis, ClassificationRule, DisagreementArea, Plurality,
};
pub use domain::{
    canonical_json, canonical_order, compute_digest, AgentDecision, ConcordError, DecisionSchema,
    DecisionValue, Result, TextEquivalence,
};
pub use hitl::{
    build_hitl_request, derive_request_id, escalation_semantics, validate_hitl_request,
    EscalationContext, EscalationReason, EscalationSemantics, EscalationTrigger, HitlRequest,
    CONTRACT_VERSION,
};
pub use pipeline::{evaluate, Evaluation};
pub use resolution::{
    resolve, EvaluationResult, Resolution, ResolutionPolicy, HARD_DISAGREEMENT_CONFIDENCE_CAP,
};
pub use trace::DecisionPoint;

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
