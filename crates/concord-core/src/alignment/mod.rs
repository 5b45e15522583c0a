//! Alignment analysis.
//!
//! - [`thresholds`] — `AlignmentThresholds`
//! - [`summary`] — `AlignmentState`, `AlignmentSummary`, `DisagreementArea`
//! - [`analyzer`] — `analyze`, `analyze_detailed`, `classify`

pub mod analyzer;
pub mod summary;
pub mod thresholds;

pub use analyzer::{analyze, analyze_detailed, classify, Analysis, ClassificationRule, Plurality};
pub use summary::{AlignmentState, AlignmentSummary, DisagreementArea};
pub use thresholds::AlignmentThresholds;
