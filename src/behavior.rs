//! Market behaviour analytics: trend periods, volatility clusters and
//! aggregate behaviour metrics.
//!
//! Both detectors scan the series once with an explicit two-state machine
//! (`Idle` / `Building`). The builder record carried in `Building` is
//! finalised into an immutable period when the continuation condition breaks
//! or the series ends, and dropped if it is shorter than the minimum duration.
//!
//! ## Trend slope
//!
//! The slope at index `i` is the per-step relative change of the moving
//! average over the lookback:
//!
//! ```text
//! slope_i    = (ma_i − ma_{i−k}) / (k · ma_{i−k})
//! strength_i = |slope_i| · 1000
//! ```
//!
//! A slope below `0.001` in magnitude is `Sideways`.

use crate::errors::{validate_all_finite, validate_nonzero, FractalMarketError, FractalResult};
use crate::generators::Observation;
use crate::math_utils::{autocorrelation, mean, sign, simple_moving_average};
use crate::statistics::{settled_volatilities, DEFAULT_VOLATILITY_WINDOW};
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Moves smaller than this fraction count as "no move".
pub const NEGLIGIBLE_MOVE: f64 = 0.001;

/// Direction of a detected trend period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrendDirection {
    /// Rising moving average
    Upward,
    /// Falling moving average
    Downward,
    /// Moving average flat within the slope threshold
    Sideways,
}

impl TrendDirection {
    /// Expected sign of price moves in this direction.
    pub fn expected_sign(&self) -> f64 {
        match self {
            TrendDirection::Upward => 1.0,
            TrendDirection::Downward => -1.0,
            TrendDirection::Sideways => 0.0,
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrendDirection::Upward => "Upward",
            TrendDirection::Downward => "Downward",
            TrendDirection::Sideways => "Sideways",
        };
        f.write_str(name)
    }
}

/// A closed trend over `series[start_index ..= end_index]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrendPeriod {
    /// First index of the trend
    pub start_index: usize,
    /// Last index of the trend (inclusive)
    pub end_index: usize,
    /// Trend direction
    pub direction: TrendDirection,
    /// Mean slope strength over the period
    pub strength: f64,
    /// Fraction of single-step moves agreeing with the direction, in `[0, 1]`
    pub persistence: f64,
    /// Timestamp at `start_index`
    pub start_time: DateTime<Utc>,
    /// Timestamp at `end_index`
    pub end_time: DateTime<Utc>,
}

impl TrendPeriod {
    /// Number of observations covered.
    pub fn duration(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// A closed run of elevated volatility.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolatilityCluster {
    /// First index of the cluster
    pub start_index: usize,
    /// Last index of the cluster (inclusive)
    pub end_index: usize,
    /// Peak ratio of volatility to the series average
    pub intensity_multiplier: f64,
    /// Mean volatility inside the cluster
    pub average_volatility: f64,
    /// Timestamp at `start_index`
    pub start_time: DateTime<Utc>,
    /// Timestamp at `end_index`
    pub end_time: DateTime<Utc>,
}

impl VolatilityCluster {
    /// Number of observations covered.
    pub fn duration(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Whole-series directional bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MarketBias {
    /// Total return above the band
    Bullish,
    /// Total return below the band
    Bearish,
    /// Total return within the band
    Sideways,
}

impl fmt::Display for MarketBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketBias::Bullish => "Bullish",
            MarketBias::Bearish => "Bearish",
            MarketBias::Sideways => "Sideways",
        };
        f.write_str(name)
    }
}

/// Overall trend of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverallTrend {
    /// Directional bias
    pub bias: MarketBias,
    /// Return from the opening mean to the closing mean
    pub total_return: f64,
    /// `|total_return| * 100`
    pub strength: f64,
}

/// Behaviour analyzer parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BehaviorConfig {
    /// Moving-average window for trend slopes
    pub trend_window: usize,
    /// Steps between the two moving-average points of a slope
    pub slope_lookback: usize,
    /// Strength that opens a trend
    pub trend_start_strength: f64,
    /// Strength a trend must keep to continue
    pub trend_continue_strength: f64,
    /// Shortest trend kept
    pub min_trend_duration: usize,
    /// Rolling window the series volatility was computed with
    pub volatility_window: usize,
    /// Multiple of average volatility that opens a cluster
    pub cluster_threshold_multiplier: f64,
    /// Fraction of the entry threshold a cluster must stay above
    pub cluster_continue_ratio: f64,
    /// Shortest cluster kept
    pub min_cluster_duration: usize,
    /// Prices averaged at each end for the overall trend
    pub overall_sample: usize,
    /// Half-width of the sideways band on total return
    pub overall_band: f64,
    /// Moving-average window for mean reversion
    pub mean_reversion_window: usize,
    /// Trailing returns summed for momentum
    pub momentum_lookback: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            trend_window: 50,
            slope_lookback: 5,
            trend_start_strength: 0.5,
            trend_continue_strength: 0.3,
            min_trend_duration: 10,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            cluster_threshold_multiplier: 1.5,
            cluster_continue_ratio: 0.8,
            min_cluster_duration: 3,
            overall_sample: 10,
            overall_band: 0.02,
            mean_reversion_window: 20,
            momentum_lookback: 10,
        }
    }
}

impl BehaviorConfig {
    /// Reject zero-sized windows and inverted thresholds.
    pub fn validate(&self) -> FractalResult<()> {
        validate_nonzero(self.trend_window, "trend_window")?;
        validate_nonzero(self.slope_lookback, "slope_lookback")?;
        validate_nonzero(self.volatility_window, "volatility_window")?;
        validate_nonzero(self.overall_sample, "overall_sample")?;
        validate_nonzero(self.mean_reversion_window, "mean_reversion_window")?;
        validate_nonzero(self.momentum_lookback, "momentum_lookback")?;
        if self.trend_continue_strength > self.trend_start_strength {
            return Err(FractalMarketError::InvalidConfiguration {
                reason: format!(
                    "trend_continue_strength ({}) exceeds trend_start_strength ({})",
                    self.trend_continue_strength, self.trend_start_strength
                ),
            });
        }
        if !(self.cluster_continue_ratio > 0.0 && self.cluster_continue_ratio <= 1.0) {
            return Err(FractalMarketError::InvalidConfiguration {
                reason: format!(
                    "cluster_continue_ratio ({}) must lie in (0, 1]",
                    self.cluster_continue_ratio
                ),
            });
        }
        Ok(())
    }
}

/// Everything the behaviour analyzer produces for one series.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BehaviorAnalysis {
    /// Closed trend periods in scan order
    pub trend_periods: Vec<TrendPeriod>,
    /// Closed volatility clusters in scan order
    pub volatility_clusters: Vec<VolatilityCluster>,
    /// Whole-series trend
    pub overall_trend: OverallTrend,
    /// Mean of lag-1 and lag-5 volatility autocorrelation
    pub volatility_clustering_index: f64,
    /// Fraction of examined steps where the MA deviation flipped sign
    pub mean_reversion_tendency: f64,
    /// Scaled sum of recent returns in `[-1, 1]`
    pub momentum: f64,
}

/// Run every behaviour detection and metric over a series with computed
/// returns and volatility.
///
/// # Errors
/// Rejects an invalid configuration or non-finite prices.
pub fn analyze_behavior(
    series: &[Observation],
    config: &BehaviorConfig,
) -> FractalResult<BehaviorAnalysis> {
    config.validate()?;
    let prices: Vec<f64> = series.iter().map(|o| o.price).collect();
    validate_all_finite(&prices, "prices")?;

    let returns: Vec<f64> = series.iter().map(|o| o.returns).collect();

    let analysis = BehaviorAnalysis {
        trend_periods: detect_trend_periods(series, config),
        volatility_clusters: detect_volatility_clusters(series, config),
        overall_trend: overall_trend_with(&prices, config.overall_sample, config.overall_band),
        volatility_clustering_index: volatility_clustering_index(series, config.volatility_window),
        mean_reversion_tendency: mean_reversion_tendency(&prices, config.mean_reversion_window),
        momentum: momentum_over(&returns, config.momentum_lookback),
    };

    log::debug!(
        "Behaviour: {} trends, {} clusters, bias {}, momentum {:.3}",
        analysis.trend_periods.len(),
        analysis.volatility_clusters.len(),
        analysis.overall_trend.bias,
        analysis.momentum
    );

    Ok(analysis)
}

struct TrendBuilder {
    start: usize,
    direction: TrendDirection,
    strength_sum: f64,
    samples: usize,
}

impl TrendBuilder {
    fn strength(&self) -> f64 {
        self.strength_sum / self.samples as f64
    }
}

enum TrendState {
    Idle,
    Building(TrendBuilder),
}

/// Slope direction and strength at each index, `None` until the moving
/// average and its lookback point both exist.
fn trend_slopes(prices: &[f64], config: &BehaviorConfig) -> Vec<Option<(TrendDirection, f64)>> {
    let ma = simple_moving_average(prices, config.trend_window);
    let k = config.slope_lookback;

    (0..prices.len())
        .map(|i| {
            if i < k {
                return None;
            }
            let (now, then) = (ma[i]?, ma[i - k]?);
            if then == 0.0 {
                return None;
            }
            let slope = (now - then) / (k as f64 * then);
            let direction = if slope.abs() < NEGLIGIBLE_MOVE {
                TrendDirection::Sideways
            } else if slope > 0.0 {
                TrendDirection::Upward
            } else {
                TrendDirection::Downward
            };
            Some((direction, slope.abs() * 1000.0))
        })
        .collect()
}

/// Detect trend periods from the slope of the moving average.
///
/// A trend opens when strength exceeds `trend_start_strength` while idle and
/// continues while the direction holds and strength stays above
/// `trend_continue_strength`. When a trend breaks at index `i` it closes at
/// `i − 1` and the opening condition is re-checked at `i`.
pub fn detect_trend_periods(series: &[Observation], config: &BehaviorConfig) -> Vec<TrendPeriod> {
    let prices: Vec<f64> = series.iter().map(|o| o.price).collect();
    let slopes = trend_slopes(&prices, config);

    let mut periods = Vec::new();
    let mut state = TrendState::Idle;

    for (i, slope) in slopes.iter().enumerate() {
        let (direction, strength) = match *slope {
            Some(s) => s,
            None => continue,
        };

        state = match state {
            TrendState::Building(mut builder) => {
                if direction == builder.direction && strength > config.trend_continue_strength {
                    builder.strength_sum += strength;
                    builder.samples += 1;
                    TrendState::Building(builder)
                } else {
                    close_trend(builder, i - 1, series, &prices, config, &mut periods);
                    TrendState::Idle
                }
            }
            idle => idle,
        };

        if matches!(state, TrendState::Idle) && strength > config.trend_start_strength {
            state = TrendState::Building(TrendBuilder {
                start: i,
                direction,
                strength_sum: strength,
                samples: 1,
            });
        }
    }

    if let TrendState::Building(builder) = state {
        close_trend(builder, series.len() - 1, series, &prices, config, &mut periods);
    }

    periods
}

fn close_trend(
    builder: TrendBuilder,
    end: usize,
    series: &[Observation],
    prices: &[f64],
    config: &BehaviorConfig,
    periods: &mut Vec<TrendPeriod>,
) {
    if end < builder.start || end - builder.start + 1 < config.min_trend_duration {
        return;
    }
    periods.push(TrendPeriod {
        start_index: builder.start,
        end_index: end,
        direction: builder.direction,
        strength: builder.strength(),
        persistence: trend_persistence(&prices[builder.start..=end], builder.direction),
        start_time: series[builder.start].timestamp,
        end_time: series[end].timestamp,
    });
}

/// Fraction of single-step moves that agree with `direction` or are
/// negligible. For `Sideways` only negligible moves agree.
pub fn trend_persistence(prices: &[f64], direction: TrendDirection) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    let expected = direction.expected_sign();
    let agreeing = prices
        .windows(2)
        .filter(|w| {
            let step = (w[1] - w[0]) / w[0];
            step.abs() < NEGLIGIBLE_MOVE || (expected != 0.0 && sign(step) == expected)
        })
        .count();
    agreeing as f64 / (prices.len() - 1) as f64
}

struct ClusterBuilder {
    start: usize,
    peak_ratio: f64,
    volatility_sum: f64,
    samples: usize,
}

enum ClusterState {
    Idle,
    Building(ClusterBuilder),
}

/// Detect runs of volatility above `cluster_threshold_multiplier` times the
/// settled average.
///
/// Only indices with a complete volatility window are scanned. A series with
/// zero average volatility has no clusters.
pub fn detect_volatility_clusters(
    series: &[Observation],
    config: &BehaviorConfig,
) -> Vec<VolatilityCluster> {
    let window = config.volatility_window;
    let average = mean(&settled_volatilities(series, window));
    if average <= 0.0 {
        return Vec::new();
    }

    let entry = average * config.cluster_threshold_multiplier;
    let hold = entry * config.cluster_continue_ratio;

    let mut clusters = Vec::new();
    let mut state = ClusterState::Idle;

    for (i, obs) in series.iter().enumerate().skip(window) {
        let vol = obs.volatility;

        state = match state {
            ClusterState::Building(mut builder) => {
                if vol > hold {
                    builder.peak_ratio = builder.peak_ratio.max(vol / average);
                    builder.volatility_sum += vol;
                    builder.samples += 1;
                    ClusterState::Building(builder)
                } else {
                    close_cluster(builder, i - 1, series, config, &mut clusters);
                    ClusterState::Idle
                }
            }
            idle => idle,
        };

        if matches!(state, ClusterState::Idle) && vol > entry {
            state = ClusterState::Building(ClusterBuilder {
                start: i,
                peak_ratio: vol / average,
                volatility_sum: vol,
                samples: 1,
            });
        }
    }

    if let ClusterState::Building(builder) = state {
        close_cluster(builder, series.len() - 1, series, config, &mut clusters);
    }

    clusters
}

fn close_cluster(
    builder: ClusterBuilder,
    end: usize,
    series: &[Observation],
    config: &BehaviorConfig,
    clusters: &mut Vec<VolatilityCluster>,
) {
    if builder.samples < config.min_cluster_duration {
        return;
    }
    clusters.push(VolatilityCluster {
        start_index: builder.start,
        end_index: end,
        intensity_multiplier: builder.peak_ratio,
        average_volatility: builder.volatility_sum / builder.samples as f64,
        start_time: series[builder.start].timestamp,
        end_time: series[end].timestamp,
    });
}

/// Overall trend from the mean of the first and last ten prices with a ±2%
/// sideways band.
pub fn overall_trend(prices: &[f64]) -> OverallTrend {
    let defaults = BehaviorConfig::default();
    overall_trend_with(prices, defaults.overall_sample, defaults.overall_band)
}

fn overall_trend_with(prices: &[f64], sample: usize, band: f64) -> OverallTrend {
    let take = sample.min(prices.len());
    let opening = mean(&prices[..take]);
    let closing = mean(&prices[prices.len() - take..]);

    let total_return = if opening > 0.0 {
        (closing - opening) / opening
    } else {
        0.0
    };
    let bias = if total_return > band {
        MarketBias::Bullish
    } else if total_return < -band {
        MarketBias::Bearish
    } else {
        MarketBias::Sideways
    };

    OverallTrend {
        bias,
        total_return,
        strength: total_return.abs() * 100.0,
    }
}

/// Mean of lag-1 and lag-5 autocorrelation of the settled volatility series.
pub fn volatility_clustering_index(series: &[Observation], window: usize) -> f64 {
    let volatilities = settled_volatilities(series, window);
    (autocorrelation(&volatilities, 1) + autocorrelation(&volatilities, 5)) / 2.0
}

/// Fraction of steps whose deviation from the moving average changed sign.
///
/// Deviation is `(price − ma) / ma`. A step is examined when the previous
/// deviation exceeds [`NEGLIGIBLE_MOVE`] in magnitude. Returns 0 when no step
/// qualifies.
pub fn mean_reversion_tendency(prices: &[f64], window: usize) -> f64 {
    let deviations: Vec<Option<f64>> = simple_moving_average(prices, window)
        .iter()
        .zip(prices)
        .map(|(ma, &p)| ma.filter(|m| *m != 0.0).map(|m| (p - m) / m))
        .collect();

    let mut examined = 0usize;
    let mut reversions = 0usize;
    for pair in deviations.windows(2) {
        if let (Some(previous), Some(current)) = (pair[0], pair[1]) {
            if previous.abs() > NEGLIGIBLE_MOVE {
                examined += 1;
                if previous * current < 0.0 {
                    reversions += 1;
                }
            }
        }
    }

    if examined == 0 {
        0.0
    } else {
        reversions as f64 / examined as f64
    }
}

/// Sum of the last ten returns scaled by ten and clamped to `[-1, 1]`.
///
/// # Example
/// ```rust
/// use fractal_market::behavior::momentum;
///
/// assert!((momentum(&[0.01; 5]) - 0.5).abs() < 1e-12);
/// assert_eq!(momentum(&[0.2; 10]), 1.0);
/// ```
pub fn momentum(returns: &[f64]) -> f64 {
    momentum_over(returns, BehaviorConfig::default().momentum_lookback)
}

fn momentum_over(returns: &[f64], lookback: usize) -> f64 {
    let recent = &returns[returns.len().saturating_sub(lookback)..];
    (recent.iter().sum::<f64>() * 10.0).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{generate_seeded_series, MarketSeriesConfig};
    use crate::statistics::compute_returns_and_volatility;
    use assert_approx_eq::assert_approx_eq;
    use chrono::{Duration, TimeZone};

    fn series_from_prices(prices: &[f64]) -> Vec<Observation> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut series: Vec<Observation> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Observation::new(start + Duration::hours(i as i64), p, 1000.0))
            .collect();
        compute_returns_and_volatility(&mut series, DEFAULT_VOLATILITY_WINDOW).unwrap();
        series
    }

    fn with_volatility(vols: &[f64]) -> Vec<Observation> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        vols.iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut obs = Observation::new(start + Duration::hours(i as i64), 100.0, 1000.0);
                obs.volatility = v;
                obs
            })
            .collect()
    }

    #[test]
    fn test_momentum_scenario() {
        assert_approx_eq!(momentum(&[0.01, 0.01, 0.01, 0.01, 0.01]), 0.5, 1e-12);
        assert_eq!(momentum(&[-0.5; 3]), -1.0);
        assert_eq!(momentum(&[]), 0.0);
        // Only the last ten returns count
        let mut returns = vec![1.0; 5];
        returns.extend([0.0; 10]);
        assert_eq!(momentum(&returns), 0.0);
    }

    #[test]
    fn test_steady_growth_is_one_upward_trend() {
        // 1% per step keeps the MA slope near 0.01 (strength ~10)
        let prices: Vec<f64> = (0..200).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let series = series_from_prices(&prices);
        let trends = detect_trend_periods(&series, &BehaviorConfig::default());

        assert_eq!(trends.len(), 1);
        let trend = &trends[0];
        assert_eq!(trend.direction, TrendDirection::Upward);
        // First slope exists once ma[i - 5] does: i = 49 + 5
        assert_eq!(trend.start_index, 54);
        assert_eq!(trend.end_index, 199);
        assert_approx_eq!(trend.persistence, 1.0, 1e-12);
        assert!(trend.strength > 5.0);
        assert_eq!(trend.start_time, series[54].timestamp);
    }

    #[test]
    fn test_reversal_splits_trends() {
        let mut prices: Vec<f64> = (0..150).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let peak = prices[149];
        prices.extend((1..=150).map(|i| peak * 0.99_f64.powi(i)));
        let series = series_from_prices(&prices);
        let trends = detect_trend_periods(&series, &BehaviorConfig::default());

        assert!(trends.len() >= 2);
        assert_eq!(trends[0].direction, TrendDirection::Upward);
        assert_eq!(trends.last().map(|t| t.direction), Some(TrendDirection::Downward));
        for pair in trends.windows(2) {
            assert!(pair[0].end_index < pair[1].start_index);
        }
        for t in &trends {
            assert!(t.duration() >= 10);
            assert!((0.0..=1.0).contains(&t.persistence));
        }
    }

    #[test]
    fn test_flat_series_has_no_trends() {
        let series = series_from_prices(&[100.0; 120]);
        assert!(detect_trend_periods(&series, &BehaviorConfig::default()).is_empty());
    }

    #[test]
    fn test_persistence_sideways_counts_negligible_moves() {
        let prices = [100.0, 100.05, 100.0, 101.0, 100.0];
        // Moves: +0.05%, -0.05%, +1%, -1%
        assert_approx_eq!(trend_persistence(&prices, TrendDirection::Sideways), 0.5, 1e-12);
        assert_approx_eq!(trend_persistence(&prices, TrendDirection::Upward), 0.75, 1e-12);
        assert_eq!(trend_persistence(&[100.0], TrendDirection::Upward), 0.0);
    }

    #[test]
    fn test_volatility_cluster_detection() {
        let config = BehaviorConfig {
            volatility_window: 2,
            ..BehaviorConfig::default()
        };
        // Settled values: 1,1,1,1,5,5,5,5,1,1,1,1 -> mean 7/3, entry 3.5, hold 2.8
        let mut vols = vec![0.0, 0.0];
        vols.extend([1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0, 1.0, 1.0, 1.0, 1.0]);
        let series = with_volatility(&vols);

        let clusters = detect_volatility_clusters(&series, &config);
        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!((c.start_index, c.end_index), (6, 9));
        assert_eq!(c.duration(), 4);
        assert_approx_eq!(c.average_volatility, 5.0, 1e-12);
        assert_approx_eq!(c.intensity_multiplier, 5.0 / (28.0 / 12.0), 1e-12);
    }

    #[test]
    fn test_short_volatility_spike_discarded() {
        let config = BehaviorConfig {
            volatility_window: 1,
            ..BehaviorConfig::default()
        };
        let series = with_volatility(&[0.0, 1.0, 1.0, 1.0, 9.0, 9.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(detect_volatility_clusters(&series, &config).is_empty());
    }

    #[test]
    fn test_zero_volatility_has_no_clusters() {
        let series = with_volatility(&[0.0; 50]);
        assert!(detect_volatility_clusters(&series, &BehaviorConfig::default()).is_empty());
    }

    #[test]
    fn test_overall_trend_band() {
        let rising: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let trend = overall_trend(&rising);
        assert_eq!(trend.bias, MarketBias::Bullish);
        // Opening mean 104.5, closing mean 134.5
        assert_approx_eq!(trend.total_return, 30.0 / 104.5, 1e-12);
        assert_approx_eq!(trend.strength, trend.total_return * 100.0, 1e-12);

        let flat = vec![100.0; 40];
        assert_eq!(overall_trend(&flat).bias, MarketBias::Sideways);

        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert_eq!(overall_trend(&falling).bias, MarketBias::Bearish);

        assert_eq!(overall_trend(&[]).bias, MarketBias::Sideways);
    }

    #[test]
    fn test_mean_reversion_alternating() {
        // Alternates around a constant MA of 100, deviations flip every step
        let prices: Vec<f64> = (0..60)
            .map(|i| if i % 2 == 0 { 101.0 } else { 99.0 })
            .collect();
        assert_approx_eq!(mean_reversion_tendency(&prices, 20), 1.0, 1e-12);

        let steady: Vec<f64> = (0..60).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        assert_eq!(mean_reversion_tendency(&steady, 20), 0.0);
        assert_eq!(mean_reversion_tendency(&[100.0; 30], 20), 0.0);
    }

    #[test]
    fn test_analyze_behavior_on_generated_series() {
        let config = MarketSeriesConfig {
            reference_time: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..MarketSeriesConfig::default()
        };
        let mut series = generate_seeded_series(1000, 100.0, &config).unwrap();
        compute_returns_and_volatility(&mut series, DEFAULT_VOLATILITY_WINDOW).unwrap();

        let analysis = analyze_behavior(&series, &BehaviorConfig::default()).unwrap();
        assert!((-1.0..=1.0).contains(&analysis.momentum));
        assert!((0.0..=1.0).contains(&analysis.mean_reversion_tendency));
        assert!(analysis.volatility_clustering_index.is_finite());
        for c in &analysis.volatility_clusters {
            assert!(c.duration() >= 3);
            assert!(c.intensity_multiplier >= 1.5);
        }
        for t in &analysis.trend_periods {
            assert!(t.duration() >= 10);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let series = series_from_prices(&[100.0; 10]);
        let config = BehaviorConfig {
            trend_window: 0,
            ..BehaviorConfig::default()
        };
        assert!(analyze_behavior(&series, &config).is_err());

        let config = BehaviorConfig {
            trend_continue_strength: 0.9,
            ..BehaviorConfig::default()
        };
        assert!(matches!(
            analyze_behavior(&series, &config),
            Err(FractalMarketError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_empty_series() {
        let analysis = analyze_behavior(&[], &BehaviorConfig::default()).unwrap();
        assert!(analysis.trend_periods.is_empty());
        assert!(analysis.volatility_clusters.is_empty());
        assert_eq!(analysis.momentum, 0.0);
    }
}
