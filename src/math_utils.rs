//! Shared numerical helpers: regression, normalisation, moving averages and
//! autocorrelation.

use crate::errors::{FractalMarketError, FractalResult};
use statrs::statistics::Statistics;

/// Numerical tolerances.
pub mod constants {
    /// Smallest acceptable OLS denominator `n·Σx² − (Σx)²`
    pub const REGRESSION_DENOMINATOR_EPSILON: f64 = 1e-10;

    /// Range below which a series is treated as flat
    pub const FLAT_RANGE_EPSILON: f64 = 0.0;
}

/// Slope and intercept of a least-squares line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlsFit {
    /// Fitted slope
    pub slope: f64,
    /// Fitted intercept
    pub intercept: f64,
}

/// Ordinary least squares fit of `y = intercept + slope * x`.
///
/// The denominator `n·Σx² − (Σx)²` is computed from centred values
/// (`n·Σ(x−x̄)²`, algebraically identical) to avoid cancellation, and the fit
/// is rejected when it falls below
/// [`constants::REGRESSION_DENOMINATOR_EPSILON`].
///
/// # Errors
/// `InsufficientData` for fewer than two points or mismatched lengths,
/// `NumericalError` for non-finite input or a near-singular design.
///
/// # Example
/// ```rust
/// use fractal_market::math_utils::ols_regression;
///
/// let fit = ols_regression(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// ```
pub fn ols_regression(x: &[f64], y: &[f64]) -> FractalResult<OlsFit> {
    if x.len() != y.len() || x.len() < 2 {
        return Err(FractalMarketError::InsufficientData {
            required: 2,
            actual: x.len().min(y.len()),
        });
    }

    if !x.iter().chain(y).all(|v| v.is_finite()) {
        return Err(FractalMarketError::NumericalError {
            reason: "Non-finite values in regression data".to_string(),
            operation: Some("ols_regression".to_string()),
        });
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let sxx: f64 = x.iter().map(|xi| (xi - mean_x) * (xi - mean_x)).sum();

    let denominator = n * sxx;
    if denominator.abs() < constants::REGRESSION_DENOMINATOR_EPSILON {
        return Err(FractalMarketError::NumericalError {
            reason: format!(
                "Near-singular design in regression (denominator {:.2e})",
                denominator
            ),
            operation: Some("ols_regression".to_string()),
        });
    }

    let slope = sxy / sxx;
    Ok(OlsFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.mean()
    }
}

/// Sample standard deviation (divisor `n − 1`); 0 when fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        0.0
    } else {
        values.std_dev()
    }
}

/// Rescale values onto `[0, 1]`.
///
/// Returns `None` for an empty or flat input.
pub fn normalize_unit_range(values: &[f64]) -> Option<Vec<f64>> {
    let (min, max) = min_max(values)?;
    let range = max - min;
    if range <= constants::FLAT_RANGE_EPSILON {
        return None;
    }
    Some(values.iter().map(|v| (v - min) / range).collect())
}

/// Minimum and maximum of a slice, `None` when empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Trailing simple moving average aligned to the input.
///
/// Entry `i` is the mean of `values[i + 1 - window ..= i]`, or `None` while
/// fewer than `window` values are available. A zero window yields all `None`.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

/// Autocorrelation at `lag`.
///
/// Numerator sums centred products over the `n − lag` valid pairs; the
/// denominator sums squared centred values over the whole series. Returns 0
/// when `lag >= n` or the series has no variance.
pub fn autocorrelation(data: &[f64], lag: usize) -> f64 {
    let n = data.len();
    if lag >= n {
        return 0.0;
    }

    let m = mean(data);
    let denominator: f64 = data.iter().map(|v| (v - m) * (v - m)).sum();
    if denominator <= 0.0 {
        return 0.0;
    }

    let numerator: f64 = data
        .iter()
        .zip(&data[lag..])
        .map(|(a, b)| (a - m) * (b - m))
        .sum();
    numerator / denominator
}

/// Clamp into `[0, 1]`.
#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Sign as `-1.0`, `0.0` or `1.0`; zero and NaN map to `0.0`.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_ols_exact_line() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 - 0.5 * v).collect();
        let fit = ols_regression(&x, &y).unwrap();
        assert_approx_eq!(fit.slope, -0.5, 1e-12);
        assert_approx_eq!(fit.intercept, 3.0, 1e-12);
    }

    #[test]
    fn test_ols_constant_predictor_rejected() {
        let result = ols_regression(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(FractalMarketError::NumericalError { .. })
        ));
        assert!(ols_regression(&[1.0], &[2.0]).is_err());
        assert!(ols_regression(&[1.0, f64::NAN], &[2.0, 3.0]).is_err());
    }

    #[test]
    fn test_sample_std_dev() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_approx_eq!(sample_std_dev(&data), 2.5_f64.sqrt(), 1e-12);
        assert_eq!(sample_std_dev(&[3.0]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_normalize_unit_range() {
        let norm = normalize_unit_range(&[2.0, 4.0, 3.0]).unwrap();
        assert_eq!(norm, vec![0.0, 1.0, 0.5]);
        assert!(normalize_unit_range(&[5.0, 5.0, 5.0]).is_none());
        assert!(normalize_unit_range(&[]).is_none());
    }

    #[test]
    fn test_simple_moving_average_alignment() {
        let ma = simple_moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(ma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
        assert!(simple_moving_average(&[1.0, 2.0], 0).iter().all(Option::is_none));
        assert!(simple_moving_average(&[1.0, 2.0], 3).iter().all(Option::is_none));
    }

    #[test]
    fn test_autocorrelation() {
        // Alternating series is perfectly anti-correlated at lag 1
        let alt: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert_approx_eq!(autocorrelation(&alt, 1), -0.99, 1e-12);
        assert_approx_eq!(autocorrelation(&alt, 0), 1.0, 1e-12);
        assert_eq!(autocorrelation(&alt, 100), 0.0);
        assert_eq!(autocorrelation(&[2.0; 10], 1), 0.0);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.0), 1.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(f64::NAN), 0.0);
    }
}
