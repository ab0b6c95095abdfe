//! Error types and validation functions for fractal market analysis.
//!
//! Numeric degeneracies (flat windows, empty sequences, singular regressions)
//! are reported through sentinel values by the analysis functions themselves.
//! The errors in this module are reserved for caller-contract violations:
//! malformed configuration or input that should be rejected up front.

use thiserror::Error;

/// Error types for fractal market analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FractalMarketError {
    /// Insufficient data for the requested operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Invalid parameter value supplied to a generator or detector.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// Configuration whose fields are individually valid but inconsistent together.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the inconsistency
        reason: String,
    },

    /// Named series not registered with the analyzer.
    #[error("Series not found: {name}")]
    SeriesNotFound {
        /// Name of the missing series
        name: String,
    },

    /// Numerical computation error.
    #[error("Numerical computation failed: {reason}")]
    NumericalError {
        /// Detailed reason for numerical failure
        reason: String,
        /// Operation that failed
        operation: Option<String>,
    },
}

/// Result type for fractal market operations.
pub type FractalResult<T> = Result<T, FractalMarketError>;

/// Validates that data has sufficient length for an operation.
///
/// # Example
/// ```rust
/// use fractal_market::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2).is_ok());
/// assert!(validate_data_length(&data, 5).is_err());
/// ```
pub fn validate_data_length(data: &[f64], min_required: usize) -> FractalResult<()> {
    if data.len() < min_required {
        Err(FractalMarketError::InsufficientData {
            required: min_required,
            actual: data.len(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is within inclusive bounds.
///
/// # Example
/// ```rust
/// use fractal_market::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "confidence_threshold").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "confidence_threshold").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> FractalResult<()> {
    if value.is_nan() {
        return Err(FractalMarketError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min.is_nan() || max.is_nan() || min > max {
        return Err(FractalMarketError::NumericalError {
            reason: format!(
                "Invalid bounds for parameter {}: min={}, max={}",
                name, min, max
            ),
            operation: None,
        });
    }

    if value < min || value > max {
        Err(FractalMarketError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a parameter is finite and strictly positive.
pub fn validate_positive(value: f64, name: &str) -> FractalResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FractalMarketError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "finite and > 0".to_string(),
        });
    }
    Ok(())
}

/// Validates that a value is finite and not NaN.
pub fn validate_finite(value: f64, name: &str) -> FractalResult<()> {
    if !value.is_finite() {
        Err(FractalMarketError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must be finite".to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validates that a count-like parameter is non-zero.
pub fn validate_nonzero(value: usize, name: &str) -> FractalResult<()> {
    if value == 0 {
        return Err(FractalMarketError::InvalidParameter {
            parameter: name.to_string(),
            value: 0.0,
            constraint: ">= 1".to_string(),
        });
    }
    Ok(())
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value, naming its index.
///
/// # Example
/// ```rust
/// use fractal_market::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "prices").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN], "prices").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> FractalResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, &v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };

        return Err(FractalMarketError::NumericalError {
            reason: format!(
                "{} contains non-finite value at index {}: {}",
                name, i, value_desc
            ),
            operation: None,
        });
    }

    Ok(())
}
