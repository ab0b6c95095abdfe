//! Sliding-window fractal pattern detection.
//!
//! Windows of increasing length are tried at every start index. A window is a
//! candidate when its box-counting dimension lies strictly inside the
//! "interesting" band `(1.1, 1.9)`. Candidates are scored by
//!
//! ```text
//! confidence = 0.4 * dimension_score + 0.3 * length_score + 0.3 * self_similarity
//! dimension_score = clamp01(1 − |D − 1.5| / 0.5)
//! length_score    = min(1, length / 50)
//! ```
//!
//! where `self_similarity` is the best DTW similarity against the most
//! recently accepted patterns. The first length at a start whose confidence
//! exceeds the threshold is accepted, the scan jumps ahead by a third of that
//! length, and the final list keeps the `top_k` most confident patterns.

use crate::errors::{
    validate_nonzero, validate_parameter, FractalMarketError, FractalResult,
};
use crate::fractal_dimension::{estimate_fractal_dimension_with_config, BoxCountingConfig};
use crate::generators::Observation;
use crate::math_utils::{clamp01, normalize_unit_range};
use crate::similarity::max_similarity;
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape class of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PatternType {
    /// Low dimension: a smooth, trend-like path
    SmoothTrend,
    /// High dimension: a noisy, space-filling path
    HighlyVolatile,
    /// Mid dimension, ending clearly above where it started
    UpwardFractal,
    /// Mid dimension, ending clearly below where it started
    DownwardFractal,
    /// Mid dimension, midpoint far from the start/end average
    ReversalPattern,
    /// Mid dimension with no net move or reversal
    SidewaysFractal,
    /// Not enough shape information to classify
    Unknown,
}

impl PatternType {
    /// Directional bias implied by the pattern: +1 up, −1 down, 0 otherwise.
    pub fn direction(&self) -> f64 {
        match self {
            PatternType::UpwardFractal => 1.0,
            PatternType::DownwardFractal => -1.0,
            _ => 0.0,
        }
    }

    /// Stable name used by export and display layers.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::SmoothTrend => "SmoothTrend",
            PatternType::HighlyVolatile => "HighlyVolatile",
            PatternType::UpwardFractal => "UpwardFractal",
            PatternType::DownwardFractal => "DownwardFractal",
            PatternType::ReversalPattern => "ReversalPattern",
            PatternType::SidewaysFractal => "SidewaysFractal",
            PatternType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a window from its dimension and `[0, 1]`-normalised prices.
///
/// Decision order: dimension below 1.3 is a smooth trend, above 1.7 is highly
/// volatile; otherwise a net move of more than 0.1 is up/down, a midpoint more
/// than 0.2 away from the start/end average is a reversal, and anything else is
/// sideways. An empty window is `Unknown`.
pub fn classify_pattern(fractal_dimension: f64, normalized_prices: &[f64]) -> PatternType {
    if fractal_dimension < 1.3 {
        return PatternType::SmoothTrend;
    }
    if fractal_dimension > 1.7 {
        return PatternType::HighlyVolatile;
    }

    let (start, end) = match (normalized_prices.first(), normalized_prices.last()) {
        (Some(&s), Some(&e)) => (s, e),
        _ => return PatternType::Unknown,
    };

    if end > start + 0.1 {
        PatternType::UpwardFractal
    } else if end < start - 0.1 {
        PatternType::DownwardFractal
    } else {
        let mid = normalized_prices[normalized_prices.len() / 2];
        if (mid - (start + end) / 2.0).abs() > 0.2 {
            PatternType::ReversalPattern
        } else {
            PatternType::SidewaysFractal
        }
    }
}

/// A fractal pattern over `series[start_index ..= end_index]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pattern {
    /// First index of the window
    pub start_index: usize,
    /// Last index of the window (inclusive)
    pub end_index: usize,
    /// Box-counting dimension of the window
    pub fractal_dimension: f64,
    /// Best DTW similarity to recently accepted patterns, in `[0, 1]`
    pub self_similarity_index: f64,
    /// Window prices rescaled onto `[0, 1]`
    pub normalized_prices: Vec<f64>,
    /// Shape class
    pub pattern_type: PatternType,
    /// Detection confidence in `[0, 1]`
    pub confidence: f64,
    /// Timestamp of the first observation
    pub start_time: DateTime<Utc>,
    /// Timestamp of the last observation
    pub end_time: DateTime<Utc>,
}

impl Pattern {
    /// Number of observations covered.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Always false: a pattern covers at least one observation.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Pattern detector parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternDetectionConfig {
    /// Shortest window tried
    pub min_length: usize,
    /// Longest window tried
    pub max_length: usize,
    /// Length increment between tries at one start
    pub length_step: usize,
    /// Confidence a window must exceed to be accepted
    pub confidence_threshold: f64,
    /// Patterns retained after ranking
    pub top_k: usize,
    /// How many recently accepted patterns feed the self-similarity score
    pub similarity_lookback: usize,
    /// Score self-similarity with DTW; when off the term contributes 0
    pub enable_self_similarity: bool,
    /// Exclusive lower bound of the accepted dimension band
    pub min_dimension: f64,
    /// Exclusive upper bound of the accepted dimension band
    pub max_dimension: f64,
    /// Box sizes for the per-window dimension
    pub box_counting: BoxCountingConfig,
}

impl Default for PatternDetectionConfig {
    fn default() -> Self {
        Self {
            min_length: 20,
            max_length: 100,
            length_step: 5,
            confidence_threshold: 0.6,
            top_k: 10,
            similarity_lookback: 5,
            enable_self_similarity: true,
            min_dimension: 1.1,
            max_dimension: 1.9,
            box_counting: BoxCountingConfig::default(),
        }
    }
}

impl PatternDetectionConfig {
    /// Reject inconsistent settings.
    pub fn validate(&self) -> FractalResult<()> {
        validate_nonzero(self.min_length, "min_length")?;
        validate_nonzero(self.length_step, "length_step")?;
        validate_nonzero(self.top_k, "top_k")?;
        validate_parameter(self.confidence_threshold, 0.0, 1.0, "confidence_threshold")?;
        if self.min_length > self.max_length {
            return Err(FractalMarketError::InvalidConfiguration {
                reason: format!(
                    "min_length ({}) exceeds max_length ({})",
                    self.min_length, self.max_length
                ),
            });
        }
        if !(self.min_dimension < self.max_dimension) {
            return Err(FractalMarketError::InvalidConfiguration {
                reason: format!(
                    "dimension band ({}, {}) is empty",
                    self.min_dimension, self.max_dimension
                ),
            });
        }
        Ok(())
    }
}

/// Confidence score for a candidate window.
pub fn pattern_confidence(fractal_dimension: f64, length: usize, self_similarity: f64) -> f64 {
    let dimension_score = clamp01(1.0 - (fractal_dimension - 1.5).abs() / 0.5);
    let length_score = (length as f64 / 50.0).min(1.0);
    0.4 * dimension_score + 0.3 * length_score + 0.3 * clamp01(self_similarity)
}

/// Detect fractal patterns in a series.
///
/// Returns at most `config.top_k` patterns sorted by descending confidence
/// (ties keep scan order). A series shorter than `min_length` yields an empty
/// list.
///
/// # Errors
/// Rejects an invalid configuration (see [`PatternDetectionConfig::validate`]).
pub fn detect_fractal_patterns(
    series: &[Observation],
    config: &PatternDetectionConfig,
) -> FractalResult<Vec<Pattern>> {
    config.validate()?;

    let n = series.len();
    if n < config.min_length {
        log::debug!(
            "Series of {} points is shorter than min_length {}; no patterns",
            n,
            config.min_length
        );
        return Ok(Vec::new());
    }

    let prices: Vec<f64> = series.iter().map(|o| o.price).collect();
    let mut accepted: Vec<Pattern> = Vec::new();
    let mut windows_tried = 0usize;

    let mut start = 0;
    while start <= n - config.min_length {
        let max_len = config.max_length.min(n - start);
        let mut next_start = start + 1;

        let mut length = config.min_length;
        while length <= max_len {
            windows_tried += 1;
            let window = &prices[start..start + length];

            let dimension = estimate_fractal_dimension_with_config(window, &config.box_counting);
            if dimension > config.min_dimension && dimension < config.max_dimension {
                let normalized =
                    normalize_unit_range(window).unwrap_or_else(|| vec![0.5; length]);

                let self_similarity = if config.enable_self_similarity {
                    let recent = accepted
                        .iter()
                        .rev()
                        .take(config.similarity_lookback)
                        .map(|p| p.normalized_prices.as_slice());
                    max_similarity(&normalized, recent)
                } else {
                    0.0
                };

                let confidence = pattern_confidence(dimension, length, self_similarity);
                if confidence > config.confidence_threshold {
                    let end = start + length - 1;
                    accepted.push(Pattern {
                        start_index: start,
                        end_index: end,
                        fractal_dimension: dimension,
                        self_similarity_index: self_similarity,
                        pattern_type: classify_pattern(dimension, &normalized),
                        normalized_prices: normalized,
                        confidence,
                        start_time: series[start].timestamp,
                        end_time: series[end].timestamp,
                    });
                    next_start = start + length / 3 + 1;
                    break;
                }
            }

            length += config.length_step;
        }

        start = next_start;
    }

    let found = accepted.len();
    accepted.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    accepted.truncate(config.top_k);

    log::debug!(
        "Pattern scan: {} windows tried, {} accepted, {} retained",
        windows_tried,
        found,
        accepted.len()
    );

    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{generate_seeded_series, MarketSeriesConfig};
    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn sample_series(n: usize, seed: u64) -> Vec<Observation> {
        let config = MarketSeriesConfig {
            seed,
            reference_time: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            ..MarketSeriesConfig::default()
        };
        generate_seeded_series(n, 100.0, &config).unwrap()
    }

    #[test]
    fn test_classification_tree() {
        let ramp: Vec<f64> = (0..30).map(|i| i as f64 / 29.0).collect();
        assert_eq!(classify_pattern(1.5, &ramp), PatternType::UpwardFractal);
        assert_eq!(classify_pattern(1.2, &ramp), PatternType::SmoothTrend);
        assert_eq!(classify_pattern(1.8, &ramp), PatternType::HighlyVolatile);

        let falling: Vec<f64> = ramp.iter().rev().copied().collect();
        assert_eq!(classify_pattern(1.5, &falling), PatternType::DownwardFractal);

        let v_shape = [1.0, 0.5, 0.0, 0.5, 1.0];
        assert_eq!(classify_pattern(1.5, &v_shape), PatternType::ReversalPattern);

        let flat = [0.5, 0.4, 0.6, 0.5, 0.5];
        assert_eq!(classify_pattern(1.5, &flat), PatternType::SidewaysFractal);

        assert_eq!(classify_pattern(1.5, &[]), PatternType::Unknown);
    }

    #[test]
    fn test_confidence_weights() {
        // Perfect dimension, long window, identical to a prior pattern
        assert!((pattern_confidence(1.5, 100, 1.0) - 1.0).abs() < 1e-12);
        // Dimension at the band edge contributes nothing
        assert!((pattern_confidence(2.0, 50, 0.0) - 0.3).abs() < 1e-12);
        assert!((pattern_confidence(1.5, 25, 0.0) - (0.4 + 0.15)).abs() < 1e-12);
    }

    #[test]
    fn test_short_series_yields_nothing() {
        let series = sample_series(10, 1);
        let patterns = detect_fractal_patterns(&series, &PatternDetectionConfig::default()).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let series = sample_series(50, 1);
        let config = PatternDetectionConfig {
            min_length: 60,
            max_length: 40,
            ..PatternDetectionConfig::default()
        };
        assert!(matches!(
            detect_fractal_patterns(&series, &config),
            Err(FractalMarketError::InvalidConfiguration { .. })
        ));

        let config = PatternDetectionConfig {
            length_step: 0,
            ..PatternDetectionConfig::default()
        };
        assert!(detect_fractal_patterns(&series, &config).is_err());

        let config = PatternDetectionConfig {
            confidence_threshold: 1.5,
            ..PatternDetectionConfig::default()
        };
        assert!(detect_fractal_patterns(&series, &config).is_err());
    }

    #[test]
    fn test_detected_patterns_invariants() {
        let series = sample_series(400, 42);
        let config = PatternDetectionConfig::default();
        let patterns = detect_fractal_patterns(&series, &config).unwrap();

        assert!(!patterns.is_empty());
        assert!(patterns.len() <= config.top_k);

        let mut spans = HashSet::new();
        for p in &patterns {
            assert!(spans.insert((p.start_index, p.end_index)));
            assert!(p.confidence > config.confidence_threshold && p.confidence <= 1.0);
            assert!(p.fractal_dimension > 1.1 && p.fractal_dimension < 1.9);
            assert!((0.0..=1.0).contains(&p.self_similarity_index));
            assert_eq!(p.normalized_prices.len(), p.len());
            assert!(p.len() >= config.min_length && p.len() <= config.max_length);
            assert_eq!(p.start_time, series[p.start_index].timestamp);
            assert_eq!(p.end_time, series[p.end_index].timestamp);
            assert!(p
                .normalized_prices
                .iter()
                .all(|v| (0.0..=1.0).contains(v)));
        }

        for pair in patterns.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_top_k_cap() {
        let series = sample_series(400, 7);
        let config = PatternDetectionConfig {
            top_k: 3,
            confidence_threshold: 0.0,
            ..PatternDetectionConfig::default()
        };
        let capped = detect_fractal_patterns(&series, &config).unwrap();
        assert_eq!(capped.len(), 3);

        let uncapped = detect_fractal_patterns(
            &series,
            &PatternDetectionConfig {
                top_k: usize::MAX,
                ..config
            },
        )
        .unwrap();
        assert!(uncapped.len() > 3);
        assert_eq!(capped.as_slice(), &uncapped[..3]);
        assert!(uncapped[3..]
            .iter()
            .all(|p| p.confidence <= capped[2].confidence));
    }

    #[test]
    fn test_scan_skips_ahead_and_scores_against_recent_patterns() {
        let series = sample_series(400, 42);
        let config = PatternDetectionConfig {
            top_k: usize::MAX,
            ..PatternDetectionConfig::default()
        };
        let mut patterns = detect_fractal_patterns(&series, &config).unwrap();
        assert!(patterns.len() >= 2);

        // Start indices strictly increase during the scan
        patterns.sort_by_key(|p| p.start_index);

        assert_eq!(patterns[0].self_similarity_index, 0.0);
        for pair in patterns.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert!(
                next.start_index >= prev.start_index + prev.len() / 3 + 1,
                "pattern at {} starts inside the skip of the one at {}",
                next.start_index,
                prev.start_index
            );
        }

        for (i, p) in patterns.iter().enumerate() {
            let lookback = i.saturating_sub(config.similarity_lookback);
            let expected = max_similarity(
                &p.normalized_prices,
                patterns[lookback..i]
                    .iter()
                    .map(|q| q.normalized_prices.as_slice()),
            );
            assert_approx_eq!(p.self_similarity_index, expected, 1e-12);
            assert_approx_eq!(
                p.confidence,
                pattern_confidence(p.fractal_dimension, p.len(), p.self_similarity_index),
                1e-12
            );
        }
        assert!(patterns[1..].iter().any(|p| p.self_similarity_index > 0.0));
    }

    #[test]
    fn test_self_similarity_can_be_disabled() {
        let series = sample_series(400, 42);
        let config = PatternDetectionConfig {
            enable_self_similarity: false,
            confidence_threshold: 0.0,
            ..PatternDetectionConfig::default()
        };
        let patterns = detect_fractal_patterns(&series, &config).unwrap();
        assert!(!patterns.is_empty());
        assert!(patterns.iter().all(|p| p.self_similarity_index == 0.0));
    }

    #[test]
    fn test_flat_series_has_no_patterns() {
        let config = MarketSeriesConfig::flat();
        let series = generate_seeded_series(120, 100.0, &config).unwrap();
        let patterns = detect_fractal_patterns(&series, &PatternDetectionConfig::default()).unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_pattern_type_display() {
        assert_eq!(PatternType::UpwardFractal.to_string(), "UpwardFractal");
        assert_eq!(PatternType::DownwardFractal.direction(), -1.0);
        assert_eq!(PatternType::ReversalPattern.direction(), 0.0);
    }
}
