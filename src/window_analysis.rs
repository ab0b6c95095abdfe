//! Fractal dimension over a fixed set of named windows of one series.
//!
//! Every window reads the same immutable price slice and writes its own
//! result, so the windows are estimated independently (in parallel with the
//! `parallel` feature) and joined once when the results are collected. Output
//! order always follows the window order, whatever order workers finish in.

use crate::fractal_dimension::{estimate_fractal_dimension_with_config, BoxCountingConfig};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named half-open index range `[start, start + size)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FractalWindow {
    /// Display label
    pub label: String,
    /// First index
    pub start: usize,
    /// Requested length before clipping
    pub size: usize,
}

impl FractalWindow {
    /// New window.
    pub fn new(label: impl Into<String>, start: usize, size: usize) -> Self {
        Self {
            label: label.into(),
            start,
            size,
        }
    }

    /// Clip to a series of `len` points; `None` if the window starts past the end
    /// or is empty after clipping.
    pub fn clip(&self, len: usize) -> Option<(usize, usize)> {
        if self.start >= len || self.size == 0 {
            return None;
        }
        let end = self.start.saturating_add(self.size).min(len);
        Some((self.start, end))
    }
}

/// Dimension estimated over one window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowDimension {
    /// Window label
    pub label: String,
    /// First index covered
    pub start_index: usize,
    /// Last index covered (inclusive)
    pub end_index: usize,
    /// Points covered after clipping
    pub size: usize,
    /// Box-counting dimension of the window
    pub fractal_dimension: f64,
}

/// The reference window set for a series of `len` points: the whole series,
/// the last 1000 and 500 points, and 2000-point blocks starting at 0, 2000 and
/// 6000.
pub fn standard_windows(len: usize) -> Vec<FractalWindow> {
    vec![
        FractalWindow::new("full", 0, len),
        FractalWindow::new("last1000", len.saturating_sub(1000), 1000.min(len)),
        FractalWindow::new("last500", len.saturating_sub(500), 500.min(len)),
        FractalWindow::new("first2000", 0, 2000),
        FractalWindow::new("mid2000", 2000, 2000),
        FractalWindow::new("late2000", 6000, 2000),
    ]
}

/// Estimate the dimension of every window that overlaps the series.
///
/// Windows starting beyond the series are dropped; windows running past the
/// end are clipped. Results keep the order of `windows`.
///
/// # Example
/// ```rust
/// use fractal_market::fractal_dimension::BoxCountingConfig;
/// use fractal_market::window_analysis::{compute_window_dimensions, standard_windows};
///
/// let prices: Vec<f64> = (0..1500).map(|i| (i as f64 * 0.1).sin()).collect();
/// let dims = compute_window_dimensions(&prices, &standard_windows(prices.len()), &BoxCountingConfig::default());
/// let labels: Vec<&str> = dims.iter().map(|d| d.label.as_str()).collect();
/// assert_eq!(labels, ["full", "last1000", "last500", "first2000"]);
/// ```
pub fn compute_window_dimensions(
    prices: &[f64],
    windows: &[FractalWindow],
    config: &BoxCountingConfig,
) -> Vec<WindowDimension> {
    let estimate = |window: &FractalWindow| -> Option<WindowDimension> {
        let (start, end) = window.clip(prices.len())?;
        Some(WindowDimension {
            label: window.label.clone(),
            start_index: start,
            end_index: end - 1,
            size: end - start,
            fractal_dimension: estimate_fractal_dimension_with_config(&prices[start..end], config),
        })
    };

    let results: Vec<WindowDimension> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            windows.par_iter().filter_map(estimate).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            windows.iter().filter_map(estimate).collect()
        }
    };

    log::debug!(
        "Estimated {} of {} windows over {} points",
        results.len(),
        windows.len(),
        prices.len()
    );

    results
}
