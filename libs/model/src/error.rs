//! Error types for model parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The condition type string is not one the instance status knows.
    #[error("unknown condition type: {0}")]
    UnknownConditionType(String),

    /// A duration field in the update strategy is negative.
    #[error("invalid {field}: {value}s must not be negative")]
    NegativeDuration { field: &'static str, value: i32 },

    /// A label value does not satisfy the label value syntax.
    #[error("invalid label value {value:?}: {reason}")]
    InvalidLabelValue { value: String, reason: &'static str },
}
