//! Incremental fractal monitoring over trailing windows.
//!
//! The monitor keeps a bounded history of observations and, on every new
//! observation, re-analyses each trailing window that is full. Every pass is a
//! pure function of the current history snapshot; the only state that
//! survives between pushes is the history itself.
//!
//! Windows are labelled with the batch detector's [`PatternType`] taxonomy
//! through [`classify_pattern`], and signals come from [`trade_signal`], so a
//! live feed and a stored series share one vocabulary.
//!
//! ## Scores per window
//!
//! ```text
//! confidence = 0.3·dimension + 0.3·range + 0.2·volatility_consistency + 0.2·length
//! strength   = clamp01((10·|Σ last 5 returns| + mean_vol / 0.02) / 2)
//! risk       = min(2, mean_vol / 0.03) + max(0, 2·(D − 1.5))
//!            + max(0, (max_vol / max(mean_vol, 0.001) − 2) / 2)
//! ```

use crate::errors::{
    validate_nonzero, validate_parameter, validate_positive, FractalMarketError, FractalResult,
};
use crate::fractal_dimension::{estimate_fractal_dimension_with_config, BoxCountingConfig};
use crate::generators::Observation;
use crate::math_utils::{clamp01, mean, min_max, normalize_unit_range, sample_std_dev};
use crate::patterns::{classify_pattern, PatternType};
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Action suggested by a streaming pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TradeSignal {
    /// Strong upward pattern
    StrongBuy,
    /// Upward pattern
    Buy,
    /// Smooth trend in place
    Hold,
    /// No actionable shape or too weak
    Neutral,
    /// Downward pattern
    Sell,
    /// Strong downward pattern
    StrongSell,
    /// Highly volatile window
    Avoid,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeSignal::StrongBuy => "StrongBuy",
            TradeSignal::Buy => "Buy",
            TradeSignal::Hold => "Hold",
            TradeSignal::Neutral => "Neutral",
            TradeSignal::Sell => "Sell",
            TradeSignal::StrongSell => "StrongSell",
            TradeSignal::Avoid => "Avoid",
        };
        f.write_str(name)
    }
}

/// Map a pattern class and strength to a signal.
///
/// Strength below 0.3 is always `Neutral`; buy and sell signals upgrade to
/// their strong form above 0.8.
pub fn trade_signal(pattern_type: PatternType, strength: f64) -> TradeSignal {
    if strength < 0.3 {
        return TradeSignal::Neutral;
    }
    let strong = strength > 0.8;
    match pattern_type {
        PatternType::UpwardFractal if strong => TradeSignal::StrongBuy,
        PatternType::UpwardFractal => TradeSignal::Buy,
        PatternType::DownwardFractal if strong => TradeSignal::StrongSell,
        PatternType::DownwardFractal => TradeSignal::Sell,
        PatternType::HighlyVolatile => TradeSignal::Avoid,
        PatternType::SmoothTrend => TradeSignal::Hold,
        _ => TradeSignal::Neutral,
    }
}

/// Monitor parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamingConfig {
    /// Trailing window lengths analysed on every push
    pub window_sizes: Vec<usize>,
    /// Returns per rolling volatility value
    pub volatility_window: usize,
    /// Lowest confidence that is emitted
    pub min_confidence: f64,
    /// Risk score above which a warning is logged
    pub risk_alert_threshold: f64,
    /// Box sizes for the per-window dimension
    pub box_counting: BoxCountingConfig,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            window_sizes: vec![20, 50, 100],
            volatility_window: 20,
            min_confidence: 0.6,
            risk_alert_threshold: 2.0,
            box_counting: BoxCountingConfig::default(),
        }
    }
}

/// A pattern recognised in a trailing window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamingPattern {
    /// Trailing window length
    pub window_size: usize,
    /// Window shape class
    pub pattern_type: PatternType,
    /// Box-counting dimension of the window
    pub fractal_dimension: f64,
    /// Recognition confidence in `[0, 1]`
    pub confidence: f64,
    /// Signal strength in `[0, 1]`
    pub strength: f64,
    /// Risk score in `[0, ∞)`
    pub risk_score: f64,
    /// Suggested action
    pub signal: TradeSignal,
    /// Timestamp of the newest observation in the window
    pub timestamp: DateTime<Utc>,
    /// Price of the newest observation in the window
    pub price: f64,
}

/// Trailing-window fractal monitor.
#[derive(Debug, Clone)]
pub struct StreamingFractalMonitor {
    config: StreamingConfig,
    capacity: usize,
    history: VecDeque<Observation>,
    recent_returns: VecDeque<f64>,
    observations_seen: u64,
    patterns_emitted: u64,
}

impl StreamingFractalMonitor {
    /// Monitor with the default windows.
    pub fn new() -> Self {
        // Default config always validates
        Self::build(StreamingConfig::default())
    }

    /// Monitor with explicit parameters.
    ///
    /// # Errors
    /// Rejects an empty or zero-length window set, a zero volatility window,
    /// a confidence floor outside `[0, 1]` or a non-positive risk threshold.
    pub fn with_config(config: StreamingConfig) -> FractalResult<Self> {
        if config.window_sizes.is_empty() {
            return Err(FractalMarketError::InvalidConfiguration {
                reason: "at least one window size is required".to_string(),
            });
        }
        for &size in &config.window_sizes {
            validate_nonzero(size, "window_size")?;
        }
        validate_nonzero(config.volatility_window, "volatility_window")?;
        validate_parameter(config.min_confidence, 0.0, 1.0, "min_confidence")?;
        validate_positive(config.risk_alert_threshold, "risk_alert_threshold")?;
        Ok(Self::build(config))
    }

    fn build(config: StreamingConfig) -> Self {
        let capacity = config.window_sizes.iter().copied().max().unwrap_or(0);
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity + 1),
            recent_returns: VecDeque::with_capacity(config.volatility_window + 1),
            observations_seen: 0,
            patterns_emitted: 0,
            config,
        }
    }

    /// Observations pushed so far.
    pub fn observations_seen(&self) -> u64 {
        self.observations_seen
    }

    /// Patterns emitted so far.
    pub fn patterns_emitted(&self) -> u64 {
        self.patterns_emitted
    }

    /// Observations currently buffered.
    pub fn buffered(&self) -> usize {
        self.history.len()
    }

    /// Accept a new price and report patterns in every full window.
    ///
    /// `returns` and `volatility` of the pushed observation are recomputed
    /// from the buffered history.
    pub fn push(&mut self, observation: Observation) -> Vec<StreamingPattern> {
        let mut obs = observation;

        obs.returns = match self.history.back() {
            Some(previous) if previous.price != 0.0 => {
                (obs.price - previous.price) / previous.price
            }
            _ => 0.0,
        };

        let window = self.config.volatility_window;
        obs.volatility = if window > 1 && self.recent_returns.len() == window {
            let trailing: Vec<f64> = self.recent_returns.iter().copied().collect();
            sample_std_dev(&trailing)
        } else {
            0.0
        };

        self.recent_returns.push_back(obs.returns);
        if self.recent_returns.len() > window {
            self.recent_returns.pop_front();
        }
        self.history.push_back(obs);
        if self.history.len() > self.capacity {
            self.history.pop_front();
        }
        self.observations_seen += 1;

        let mut found = Vec::new();
        for &size in &self.config.window_sizes {
            if self.history.len() < size {
                continue;
            }
            let start = self.history.len() - size;
            let snapshot: Vec<&Observation> = self.history.range(start..).collect();
            if let Some(pattern) = self.analyze_window(&snapshot) {
                found.push(pattern);
            }
        }

        self.patterns_emitted += found.len() as u64;
        found
    }

    fn analyze_window(&self, window: &[&Observation]) -> Option<StreamingPattern> {
        let size = window.len();
        let newest = window.last()?;
        let prices: Vec<f64> = window.iter().map(|o| o.price).collect();
        let volatilities: Vec<f64> = window.iter().map(|o| o.volatility).collect();

        let dimension = estimate_fractal_dimension_with_config(&prices, &self.config.box_counting);
        let normalized = normalize_unit_range(&prices).unwrap_or_else(|| vec![0.5; size]);
        let pattern_type = classify_pattern(dimension, &normalized);

        let (low, high) = min_max(&prices)?;
        let mean_price = mean(&prices);
        let range_score = if mean_price > 0.0 {
            (20.0 * (high - low) / mean_price).min(1.0)
        } else {
            0.0
        };

        let mean_vol = mean(&volatilities);
        let max_vol = volatilities.iter().copied().fold(0.0, f64::max);
        let vol_floor = mean_vol.max(0.001);
        let consistency = clamp01(1.0 - sample_std_dev(&volatilities) / vol_floor);

        let dimension_score = clamp01(1.0 - (dimension - 1.5).abs() / 0.5);
        let length_score = (size as f64 / 50.0).min(1.0);
        let confidence =
            0.3 * dimension_score + 0.3 * range_score + 0.2 * consistency + 0.2 * length_score;

        let recent_move: f64 = window.iter().rev().take(5).map(|o| o.returns).sum();
        let strength = clamp01((10.0 * recent_move.abs() + mean_vol / 0.02) / 2.0);

        let risk_score = (mean_vol / 0.03).min(2.0)
            + (2.0 * (dimension - 1.5)).max(0.0)
            + ((max_vol / vol_floor - 2.0) / 2.0).max(0.0);

        if risk_score > self.config.risk_alert_threshold {
            log::warn!(
                "High risk {:.2} in {}-point window ending at {} (D = {:.3}, mean vol {:.4})",
                risk_score,
                size,
                newest.timestamp,
                dimension,
                mean_vol
            );
        }

        if confidence < self.config.min_confidence {
            return None;
        }

        Some(StreamingPattern {
            window_size: size,
            pattern_type,
            fractal_dimension: dimension,
            confidence,
            strength,
            risk_score,
            signal: trade_signal(pattern_type, strength),
            timestamp: newest.timestamp,
            price: newest.price,
        })
    }
}

impl Default for StreamingFractalMonitor {
    fn default() -> Self {
        Self::new()
    }
}
