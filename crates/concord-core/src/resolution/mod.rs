//! Disagreement resolution.
//!
//! - [`resolver`] — `resolve`, `Resolution`, `ResolutionPolicy`
//! - [`result`] — `EvaluationResult`

pub mod resolver;
pub mod result;

pub use resolver::{resolve, Resolution, ResolutionPolicy, HARD_DISAGREEMENT_CONFIDENCE_CAP};
pub use result::EvaluationResult;
