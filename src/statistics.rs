//! Per-step returns and rolling volatility over a market series.

use crate::errors::{validate_nonzero, FractalResult};
use crate::generators::Observation;
use crate::math_utils::sample_std_dev;

/// Default trailing window for rolling volatility.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;

/// Fill `returns` with the fractional change from the previous price.
///
/// The first observation's return is 0.
pub fn compute_returns(series: &mut [Observation]) {
    if let Some(first) = series.first_mut() {
        first.returns = 0.0;
    }
    for i in 1..series.len() {
        let previous = series[i - 1].price;
        series[i].returns = (series[i].price - previous) / previous;
    }
}

/// Fill `volatility` with the sample standard deviation of the `window`
/// returns preceding each index.
///
/// `volatility[i]` uses `returns[i - window ..= i - 1]` and is 0 for
/// `i < window`. A window of 1 has no degrees of freedom and yields 0.
/// Expects [`compute_returns`] to have run.
///
/// # Errors
/// Rejects `window == 0`.
pub fn compute_rolling_volatility(series: &mut [Observation], window: usize) -> FractalResult<()> {
    validate_nonzero(window, "volatility_window")?;

    let returns: Vec<f64> = series.iter().map(|o| o.returns).collect();
    for (i, obs) in series.iter_mut().enumerate() {
        obs.volatility = if i < window || window == 1 {
            0.0
        } else {
            sample_std_dev(&returns[i - window..i])
        };
    }
    Ok(())
}

/// Compute returns then rolling volatility in place.
pub fn compute_returns_and_volatility(
    series: &mut [Observation],
    window: usize,
) -> FractalResult<()> {
    compute_returns(series);
    compute_rolling_volatility(series, window)?;
    log::debug!(
        "Computed returns and {}-step rolling volatility over {} observations",
        window,
        series.len()
    );
    Ok(())
}

/// Volatility values from the first index with a complete window onward.
pub fn settled_volatilities(series: &[Observation], window: usize) -> Vec<f64> {
    series
        .iter()
        .skip(window)
        .map(|o| o.volatility)
        .collect()
}
