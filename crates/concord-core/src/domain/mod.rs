//! Domain model for the reconciliation engine.
//!
//! - `DecisionSchema` / `DecisionValue`: the legal decision space
//! - `AgentDecision`: one producer's finished decision
//! - `ConcordError`: the error taxonomy
//! - `digest`: canonical JSON and content digests

pub mod decision;
pub mod digest;
pub mod error;
pub mod schema;

pub use decision::{canonical_order, AgentDecision};
pub use digest::{canonical_json, compute_digest};
pub use error::{ConcordError, Result};
pub use schema::{DecisionSchema, DecisionValue, TextEquivalence};
