//! Box-counting fractal dimension of a price path.
//!
//! The path is the polyline through `(i, y_i)` where `y_i` is the price
//! rescaled onto `[0, n − 1]`, so both axes are measured in index units and a
//! box of size `b` is a `b × b` square. For each box size the number of
//! occupied boxes is counted, and the dimension is the least-squares slope of
//! `ln(count)` against `ln(1/b)`.
//!
//! ## Coverage
//!
//! Segments are rasterised in full rather than by their endpoints. Every
//! segment spans exactly one index step, so it lies within a single box
//! column, and the connected path inside one column occupies a contiguous run
//! of rows. A column's count is therefore the row span of the samples it
//! touches, inclusive of the first sample of the next column where the last
//! segment ends. Rows are derived from `floor(y)` by integer division, which
//! makes counts exactly nested: when one box size divides another, the larger
//! size never reports more boxes.
//!
//! Box sizes are powers of two by default. [`BoxCountingConfig::reference`]
//! restores the mixed set `{1, 2, 3, 4, 5, 8, 10, ...}`. Its grids are not
//! nested, so a larger size can report more boxes: the ten-point path
//! `[4, 8, 8, 8, 14, 11, 10, 10, 8, 9]` covers 7 boxes of size 3 but 8 of
//! size 4. On long random walks this is rare.
//!
//! The estimate is a simplified, non-rigorous variant intended for relative
//! comparison of windows, not for inference.

use crate::math_utils::{normalize_unit_range, ols_regression};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dimension reported when the input carries no usable signal.
pub const DEFAULT_DIMENSION: f64 = 1.0;

/// Shortest series the estimator will analyse.
pub const MIN_SERIES_LENGTH: usize = 4;

/// Fewest `(size, count)` pairs required for the regression.
pub const MIN_SCALES: usize = 3;

/// Box-counting parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxCountingConfig {
    /// Candidate box sizes in ascending order. Sizes `>= len / 2` are skipped.
    pub box_sizes: Vec<usize>,
}

impl Default for BoxCountingConfig {
    fn default() -> Self {
        Self {
            box_sizes: (0..20).map(|k| 1usize << k).collect(),
        }
    }
}

impl BoxCountingConfig {
    /// Mixed box-size set used by the multi-language ports.
    pub fn reference() -> Self {
        Self {
            box_sizes: vec![1, 2, 3, 4, 5, 8, 10, 16, 20, 25, 32, 40],
        }
    }

    /// Sizes that apply to a series of `len` points.
    pub fn sizes_for(&self, len: usize) -> impl Iterator<Item = usize> + '_ {
        let limit = len / 2;
        self.box_sizes
            .iter()
            .copied()
            .filter(move |&b| b > 0 && b < limit)
    }
}

/// Occupied-box count at one box size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxCount {
    /// Box side length in index units
    pub box_size: usize,
    /// Number of occupied boxes
    pub count: usize,
}

/// Dimension estimate together with the counts it was fitted on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxCountingResult {
    /// Regression slope, or [`DEFAULT_DIMENSION`] for degenerate input
    pub dimension: f64,
    /// Counts per applicable box size
    pub counts: Vec<BoxCount>,
}

/// Estimate the fractal dimension with the default dyadic box sizes.
///
/// Returns 1.0 for series shorter than four points, flat series, fewer than
/// three usable scales, or a singular regression.
///
/// # Example
/// ```rust
/// use fractal_market::fractal_dimension::estimate_fractal_dimension;
///
/// let ramp: Vec<f64> = (0..64).map(|i| i as f64).collect();
/// let d = estimate_fractal_dimension(&ramp);
/// assert!((d - 1.0).abs() < 0.15);
///
/// assert_eq!(estimate_fractal_dimension(&[5.0; 32]), 1.0);
/// ```
pub fn estimate_fractal_dimension(prices: &[f64]) -> f64 {
    estimate_fractal_dimension_with_config(prices, &BoxCountingConfig::default())
}

/// Estimate the fractal dimension with explicit box sizes.
pub fn estimate_fractal_dimension_with_config(prices: &[f64], config: &BoxCountingConfig) -> f64 {
    box_counting(prices, config).dimension
}

/// Full box-counting analysis of a price series.
pub fn box_counting(prices: &[f64], config: &BoxCountingConfig) -> BoxCountingResult {
    let degenerate = |counts: Vec<BoxCount>| BoxCountingResult {
        dimension: DEFAULT_DIMENSION,
        counts,
    };

    if prices.len() < MIN_SERIES_LENGTH || !prices.iter().all(|p| p.is_finite()) {
        return degenerate(Vec::new());
    }

    let rows = match path_rows(prices) {
        Some(rows) => rows,
        None => return degenerate(Vec::new()),
    };

    let counts: Vec<BoxCount> = config
        .sizes_for(prices.len())
        .map(|box_size| BoxCount {
            box_size,
            count: count_boxes(&rows, box_size),
        })
        .filter(|c| c.count > 0)
        .collect();

    if counts.len() < MIN_SCALES {
        return degenerate(counts);
    }

    let log_inverse_size: Vec<f64> = counts
        .iter()
        .map(|c| (1.0 / c.box_size as f64).ln())
        .collect();
    let log_count: Vec<f64> = counts.iter().map(|c| (c.count as f64).ln()).collect();

    match ols_regression(&log_inverse_size, &log_count) {
        Ok(fit) => BoxCountingResult {
            dimension: fit.slope,
            counts,
        },
        Err(_) => degenerate(counts),
    }
}

/// Occupied-box counts for each applicable size, without the regression.
///
/// Flat or too-short input yields an empty vector.
pub fn box_counts(prices: &[f64], config: &BoxCountingConfig) -> Vec<BoxCount> {
    match path_rows(prices) {
        Some(rows) => config
            .sizes_for(prices.len())
            .map(|box_size| BoxCount {
                box_size,
                count: count_boxes(&rows, box_size),
            })
            .collect(),
        None => Vec::new(),
    }
}

/// `floor(y_i)` for the path rescaled onto `[0, n − 1]`.
fn path_rows(prices: &[f64]) -> Option<Vec<u64>> {
    let normalized = normalize_unit_range(prices)?;
    let height = (prices.len() - 1) as f64;
    Some(
        normalized
            .iter()
            .map(|y| (y * height).floor().max(0.0) as u64)
            .collect(),
    )
}

fn count_boxes(rows: &[u64], box_size: usize) -> usize {
    let n = rows.len();
    if n == 0 {
        return 0;
    }
    let b = box_size as u64;
    let last = n - 1;

    let mut total = 0usize;
    let mut start = 0usize;
    while start <= last {
        if start == last {
            // Final sample opens a column of its own
            total += 1;
            break;
        }
        let end = (start + box_size).min(last);
        let (lo, hi) = rows[start..=end]
            .iter()
            .fold((u64::MAX, 0u64), |(lo, hi), &r| (lo.min(r), hi.max(r)));
        total += (hi / b - lo / b) as usize + 1;
        start += box_size;
    }
    total
}
