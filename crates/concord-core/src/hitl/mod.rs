//! Human-in-the-loop escalation contract.
//!
//! - [`builder`] — decides whether a resolved evaluation escalates and builds
//!   the [`HitlRequest`] payload with a content-derived id.
//! - [`contract`] — validates received payloads and publishes the escalation
//!   semantics.
//! - [`request`] — the payload types.
//!
//! The contract is pure: it never blocks, notifies or persists anything.

pub mod builder;
pub mod contract;
pub mod request;

pub use builder::{build_hitl_request, derive_request_id};
pub use contract::{
    escalation_semantics, validate_hitl_request, EscalationSemantics, EscalationTrigger,
    CONTRACT_VERSION,
};
pub use request::{EscalationContext, EscalationReason, HitlRequest};
