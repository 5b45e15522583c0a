//! Error taxonomy for the reconciliation engine.
//!
//! Every error is local and synchronous. Nothing here is retried by the
//! engine itself; callers translate failures into whatever their transport
//! needs.

/// Concord engine errors.
#[derive(Debug, thiserror::Error)]
pub enum ConcordError {
    #[error("decision set is empty: at least one decision is required")]
    EmptyDecisionSet,

    #[error("invalid decision: {detail}")]
    InvalidDecision { detail: String },

    #[error("task id must not be blank")]
    BlankTaskId,

    #[error("duplicate producer in decision set: {producer}")]
    DuplicateProducer { producer: String },

    #[error("invalid confidence: {detail}")]
    InvalidConfidence { detail: String },

    #[error("schema violation by {producer}: {detail}")]
    SchemaViolation { producer: String, detail: String },

    #[error("invalid decision schema: {0}")]
    InvalidSchema(String),

    #[error("invalid alignment thresholds: {0}")]
    InvalidThresholds(String),

    #[error("escalation contract violation: {0}")]
    ContractViolation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Concord engine operations.
pub type Result<T> = std::result::Result<T, ConcordError>;
