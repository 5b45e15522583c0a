//! Decision schemas: the space of legal decision values for one evaluation.
//!
//! A schema is a closed set of variants. Each variant answers the same three
//! questions: is this value legal, are these two values the same decision,
//! and what confidence does this raw input normalize to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{ConcordError, Result};

/// A decision value as it appears on the wire: boolean, number, or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecisionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl DecisionValue {
    /// Short name of the value kind, used in violation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for DecisionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for DecisionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for DecisionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DecisionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DecisionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// How free-form answers are compared for agreement.
///
/// The engine never measures semantic similarity. `Normalized` is an explicit
/// caller opt-in that folds case and whitespace before an exact compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEquivalence {
    #[default]
    Exact,
    Normalized,
}

impl TextEquivalence {
    fn equal(self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => a == b,
            Self::Normalized => normalize_text(a) == normalize_text(b),
        }
    }
}

fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn default_positive_label() -> String {
    "positive".to_string()
}

fn default_negative_label() -> String {
    "negative".to_string()
}

/// The declared decision space for an evaluation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionSchema {
    /// Binary outcome with configurable labels (approve/reject, safe/unsafe, ...).
    Boolean {
        #[serde(default = "default_positive_label")]
        positive_label: String,
        #[serde(default = "default_negative_label")]
        negative_label: String,
    },
    /// One label out of a fixed set.
    Categorical { categories: Vec<String> },
    /// A number inside the closed interval `[min, max]`.
    Scalar { min: f64, max: f64 },
    /// Open-ended non-empty text.
    FreeForm {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        #[serde(default)]
        equivalence: TextEquivalence,
    },
}

impl DecisionSchema {
    /// Boolean schema with the default "positive"/"negative" labels.
    pub fn boolean() -> Self {
        Self::Boolean {
            positive_label: default_positive_label(),
            negative_label: default_negative_label(),
        }
    }

    /// Boolean schema with custom labels.
    pub fn boolean_labeled(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self::Boolean {
            positive_label: positive.into(),
            negative_label: negative.into(),
        }
    }

    pub fn categorical<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Categorical {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn scalar(min: f64, max: f64) -> Self {
        Self::Scalar { min, max }
    }

    /// Free-form schema with exact agreement and no length limits.
    pub fn free_form() -> Self {
        Self::FreeForm {
            min_length: None,
            max_length: None,
            equivalence: TextEquivalence::Exact,
        }
    }

    /// Schema type identifier.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean { .. } => "boolean",
            Self::Categorical { .. } => "categorical",
            Self::Scalar { .. } => "scalar",
            Self::FreeForm { .. } => "free_form",
        }
    }

    /// Check that the schema itself is well formed.
    pub fn check(&self) -> Result<()> {
        match self {
            Self::Boolean {
                positive_label,
                negative_label,
            } => {
                if positive_label.trim().is_empty() || negative_label.trim().is_empty() {
                    return Err(ConcordError::InvalidSchema(
                        "boolean labels must not be blank".into(),
                    ));
                }
                if positive_label == negative_label {
                    return Err(ConcordError::InvalidSchema(format!(
                        "boolean labels must differ (both are {positive_label:?})"
                    )));
                }
            }
            Self::Categorical { categories } => {
                if categories.is_empty() {
                    return Err(ConcordError::InvalidSchema(
                        "categories must not be empty".into(),
                    ));
                }
                if categories.iter().any(|c| c.trim().is_empty()) {
                    return Err(ConcordError::InvalidSchema(
                        "categories must not contain blank labels".into(),
                    ));
                }
                for (i, c) in categories.iter().enumerate() {
                    if categories[..i].contains(c) {
                        return Err(ConcordError::InvalidSchema(format!(
                            "duplicate category {c:?}"
                        )));
                    }
                }
            }
            Self::Scalar { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(ConcordError::InvalidSchema(
                        "scalar bounds must be finite".into(),
                    ));
                }
                if min > max {
                    return Err(ConcordError::InvalidSchema(format!(
                        "scalar min {min} exceeds max {max}"
                    )));
                }
            }
            // Equal bounds are allowed and pin an exact length.
            Self::FreeForm {
                min_length: Some(lo),
                max_length: Some(hi),
                ..
            } if lo > hi => {
                return Err(ConcordError::InvalidSchema(format!(
                    "free-form min_length {lo} exceeds max_length {hi}"
                )));
            }
            Self::FreeForm { .. } => {}
        }
        Ok(())
    }

    /// Whether `value` is a legal decision under this schema.
    pub fn validate(&self, value: &DecisionValue) -> bool {
        self.violation(value).is_none()
    }

    /// Explain why `value` is illegal, or `None` when it is legal.
    pub fn violation(&self, value: &DecisionValue) -> Option<String> {
        match (self, value) {
            (Self::Boolean { .. }, DecisionValue::Bool(_)) => None,
            (Self::Categorical { categories }, DecisionValue::Text(label)) => {
                if categories.contains(label) {
                    None
                } else {
                    Some(format!("{label:?} is not a declared category"))
                }
            }
            (Self::Scalar { min, max }, DecisionValue::Number(n)) => {
                if n.is_finite() && *min <= *n && *n <= *max {
                    None
                } else {
                    Some(format!("{n} is outside [{min}, {max}]"))
                }
            }
            (
                Self::FreeForm {
                    min_length,
                    max_length,
                    ..
                },
                DecisionValue::Text(text),
            ) => {
                let len = text.chars().count();
                if text.trim().is_empty() {
                    Some("free-form text must not be empty".to_string())
                } else if min_length.is_some_and(|lo| len < lo) {
                    Some(format!("text length {len} is below min_length"))
                } else if max_length.is_some_and(|hi| len > hi) {
                    Some(format!("text length {len} exceeds max_length"))
                } else {
                    None
                }
            }
            (schema, value) => Some(format!(
                "{} value does not fit a {} schema",
                value.kind(),
                schema.kind()
            )),
        }
    }

    /// Normalize a raw confidence input into `[0.0, 1.0]` by clamping.
    ///
    /// Accepts JSON numbers and numeric strings. Anything else, or NaN, is
    /// rejected with [`ConcordError::InvalidConfidence`].
    pub fn normalize_confidence(&self, raw: &serde_json::Value) -> Result<f64> {
        let parsed = match raw {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(c) if !c.is_nan() => Ok(c.clamp(0.0, 1.0)),
            _ => Err(ConcordError::InvalidConfidence {
                detail: format!("{raw} is not numeric"),
            }),
        }
    }

    /// Schema equality between two decision values.
    ///
    /// Scalar comparison is exact. Values of different kinds never compare equal.
    pub fn values_equal(&self, a: &DecisionValue, b: &DecisionValue) -> bool {
        match (a, b) {
            (DecisionValue::Bool(x), DecisionValue::Bool(y)) => x == y,
            (DecisionValue::Number(x), DecisionValue::Number(y)) => x == y,
            (DecisionValue::Text(x), DecisionValue::Text(y)) => match self {
                Self::FreeForm { equivalence, .. } => equivalence.equal(x, y),
                _ => x == y,
            },
            _ => false,
        }
    }

    /// Human-readable rendering of a value, using boolean labels where declared.
    pub fn render(&self, value: &DecisionValue) -> String {
        match (self, value) {
            (
                Self::Boolean {
                    positive_label,
                    negative_label,
                },
                DecisionValue::Bool(b),
            ) => {
                if *b {
                    positive_label.clone()
                } else {
                    negative_label.clone()
                }
            }
            (_, value) => value.to_string(),
        }
    }
}
