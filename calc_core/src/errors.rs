//! # Error Types
//!
//! Structured error types for calc_core. Every calculator validates its
//! input before doing any arithmetic and reports the violated precondition
//! here instead of letting NaN or infinity leak into a result.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_base_cost(base_cost: f64) -> CalcResult<()> {
//!     if base_cost <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "base_cost".to_string(),
//!             value: base_cost.to_string(),
//!             reason: "Base cost must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for calc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-finite, empty list, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Inputs were individually valid but the calculation is undefined for them
    /// (e.g. every job has zero hours under an hours-based allocation)
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Name of the offending input field, if the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::serialization(err.to_string())
    }
}

// ============================================================================
// Input guards shared by the calculators
// ============================================================================

/// Require a finite value.
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() {
        tracing::warn!(field, value, "rejected non-finite input");
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"));
    }
    Ok(value)
}

/// Require a finite value strictly greater than zero.
pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<f64> {
    require_finite(field, value)?;
    if value <= 0.0 {
        tracing::warn!(field, value, "rejected non-positive input");
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be greater than zero"));
    }
    Ok(value)
}

/// Require a finite value greater than or equal to zero.
pub(crate) fn require_non_negative(field: &str, value: f64) -> CalcResult<f64> {
    require_finite(field, value)?;
    if value < 0.0 {
        tracing::warn!(field, value, "rejected negative input");
        return Err(CalcError::invalid_input(field, value.to_string(), "Value cannot be negative"));
    }
    Ok(value)
}

/// Require a percentage in `[0, 100]`, or `[0, 100)` when `allow_hundred` is false.
pub(crate) fn require_percent(field: &str, value: f64, allow_hundred: bool) -> CalcResult<f64> {
    require_finite(field, value)?;
    let in_range = if allow_hundred {
        (0.0..=100.0).contains(&value)
    } else {
        (0.0..100.0).contains(&value)
    };
    if !in_range {
        tracing::warn!(field, value, "rejected out-of-range percentage");
        let reason = if allow_hundred {
            "Percentage must be between 0 and 100"
        } else {
            "Percentage must be at least 0 and below 100"
        };
        return Err(CalcError::invalid_input(field, value.to_string(), reason));
    }
    Ok(value)
}
