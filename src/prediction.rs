//! Heuristic ensemble prediction.
//!
//! Five independent signals each emit a direction in `[-1, 1]` and a
//! confidence in `[0, 1]`. The consensus is the confidence-weighted mean
//! direction. None of this claims predictive validity; it is a demonstration of
//! combining weak heuristics.

use crate::generators::Observation;
use crate::math_utils::{mean, sign};
use crate::patterns::Pattern;
use crate::statistics::{settled_volatilities, DEFAULT_VOLATILITY_WINDOW};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consensus magnitude beyond which the outlook is directional.
pub const CONSENSUS_THRESHOLD: f64 = 0.1;

/// Which heuristic produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PredictionMethod {
    /// Slope of recent prices
    TrendFollowing,
    /// Deviation from the moving average
    MeanReversion,
    /// Most recently ending fractal pattern
    FractalPattern,
    /// Recent volatility relative to its average
    Volatility,
    /// Sum of recent returns
    Momentum,
}

impl fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PredictionMethod::TrendFollowing => "TrendFollowing",
            PredictionMethod::MeanReversion => "MeanReversion",
            PredictionMethod::FractalPattern => "FractalPattern",
            PredictionMethod::Volatility => "Volatility",
            PredictionMethod::Momentum => "Momentum",
        };
        f.write_str(name)
    }
}

/// One heuristic's call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PredictionResult {
    /// Producing heuristic
    pub method: PredictionMethod,
    /// Direction in `[-1, 1]`
    pub predicted_direction: f64,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Human-readable justification
    pub reasoning: String,
}

impl PredictionResult {
    fn new(method: PredictionMethod, direction: f64, confidence: f64, reasoning: String) -> Self {
        Self {
            method,
            predicted_direction: direction.clamp(-1.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning,
        }
    }

    fn insufficient(method: PredictionMethod, needed: usize, available: usize) -> Self {
        Self::new(
            method,
            0.0,
            0.0,
            format!("Insufficient data: need {} points, have {}", needed, available),
        )
    }
}

/// Read-only view of one analysis run handed to every heuristic.
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    /// Series with returns and volatility computed
    pub series: &'a [Observation],
    /// Patterns detected on the series
    pub patterns: &'a [Pattern],
    /// Window the volatility column was computed with
    pub volatility_window: usize,
}

impl<'a> PredictionInput<'a> {
    /// Input using the default volatility window.
    pub fn new(series: &'a [Observation], patterns: &'a [Pattern]) -> Self {
        Self {
            series,
            patterns,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
        }
    }
}

/// A single prediction heuristic.
pub trait PredictionHeuristic: Send + Sync {
    /// Method tag attached to results
    fn method(&self) -> PredictionMethod;

    /// Produce a prediction; never fails, degrading to a zero-confidence call
    fn predict(&self, input: &PredictionInput<'_>) -> PredictionResult;
}

/// Direction of the 10-step relative price slope.
#[derive(Debug, Clone)]
pub struct TrendFollowing {
    /// Steps between the two compared prices
    pub lookback: usize,
}

impl Default for TrendFollowing {
    fn default() -> Self {
        Self { lookback: 10 }
    }
}

impl PredictionHeuristic for TrendFollowing {
    fn method(&self) -> PredictionMethod {
        PredictionMethod::TrendFollowing
    }

    fn predict(&self, input: &PredictionInput<'_>) -> PredictionResult {
        let n = input.series.len();
        if self.lookback == 0 || n <= self.lookback {
            return PredictionResult::insufficient(self.method(), self.lookback + 1, n);
        }
        let last = input.series[n - 1].price;
        let base = input.series[n - 1 - self.lookback].price;
        let slope = (last - base) / base / self.lookback as f64;

        PredictionResult::new(
            self.method(),
            sign(slope),
            (slope.abs() * 100.0).min(0.9),
            format!("{}-step price slope {:.5} per step", self.lookback, slope),
        )
    }
}

/// Bet on a return to the moving average.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    /// Moving-average window
    pub window: usize,
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl PredictionHeuristic for MeanReversion {
    fn method(&self) -> PredictionMethod {
        PredictionMethod::MeanReversion
    }

    fn predict(&self, input: &PredictionInput<'_>) -> PredictionResult {
        let n = input.series.len();
        if self.window == 0 || n < self.window {
            return PredictionResult::insufficient(self.method(), self.window.max(1), n);
        }
        let recent: Vec<f64> = input.series[n - self.window..].iter().map(|o| o.price).collect();
        let average = mean(&recent);
        let current = input.series[n - 1].price;
        let deviation = (current - average) / average;

        PredictionResult::new(
            self.method(),
            -sign(deviation),
            (deviation.abs() * 5.0).min(0.8),
            format!(
                "Price {:.1}% from its {}-step average",
                deviation * 100.0,
                self.window
            ),
        )
    }
}

/// Follow the most recently ending fractal pattern.
#[derive(Debug, Clone, Default)]
pub struct FractalPatternSignal;

impl PredictionHeuristic for FractalPatternSignal {
    fn method(&self) -> PredictionMethod {
        PredictionMethod::FractalPattern
    }

    fn predict(&self, input: &PredictionInput<'_>) -> PredictionResult {
        let latest = input.patterns.iter().max_by(|a, b| {
            a.end_index
                .cmp(&b.end_index)
                .then(a.confidence.total_cmp(&b.confidence))
        });

        match latest {
            Some(pattern) => PredictionResult::new(
                self.method(),
                pattern.pattern_type.direction(),
                pattern.confidence,
                format!(
                    "Latest pattern {} ending at {} (D = {:.3})",
                    pattern.pattern_type, pattern.end_index, pattern.fractal_dimension
                ),
            ),
            None => PredictionResult::new(
                self.method(),
                0.0,
                0.0,
                "No fractal patterns detected".to_string(),
            ),
        }
    }
}

/// Expect a reversal of the last move when volatility spikes.
#[derive(Debug, Clone)]
pub struct VolatilitySignal {
    /// Trailing volatilities compared with the average
    pub recent: usize,
    /// Ratio that counts as a spike
    pub spike_ratio: f64,
}

impl Default for VolatilitySignal {
    fn default() -> Self {
        Self {
            recent: 5,
            spike_ratio: 1.5,
        }
    }
}

impl PredictionHeuristic for VolatilitySignal {
    fn method(&self) -> PredictionMethod {
        PredictionMethod::Volatility
    }

    fn predict(&self, input: &PredictionInput<'_>) -> PredictionResult {
        let volatilities = settled_volatilities(input.series, input.volatility_window);
        if self.recent == 0 || volatilities.len() < self.recent {
            return PredictionResult::insufficient(
                self.method(),
                input.volatility_window + self.recent.max(1),
                input.series.len(),
            );
        }

        let overall = mean(&volatilities);
        if overall <= 0.0 {
            return PredictionResult::new(
                self.method(),
                0.0,
                0.0,
                "No volatility in the series".to_string(),
            );
        }

        let recent = mean(&volatilities[volatilities.len() - self.recent..]);
        let ratio = recent / overall;
        let last_return = input.series.last().map_or(0.0, |o| o.returns);
        let direction = if ratio > self.spike_ratio {
            -sign(last_return)
        } else {
            0.0
        };

        PredictionResult::new(
            self.method(),
            direction,
            (ratio - 1.0).abs().min(0.7),
            format!("Recent volatility at {:.2}x its average", ratio),
        )
    }
}

/// Direction of the sum of recent returns.
#[derive(Debug, Clone)]
pub struct MomentumSignal {
    /// Trailing returns summed
    pub lookback: usize,
}

impl Default for MomentumSignal {
    fn default() -> Self {
        Self { lookback: 5 }
    }
}

impl PredictionHeuristic for MomentumSignal {
    fn method(&self) -> PredictionMethod {
        PredictionMethod::Momentum
    }

    fn predict(&self, input: &PredictionInput<'_>) -> PredictionResult {
        let n = input.series.len();
        if self.lookback == 0 || n < self.lookback {
            return PredictionResult::insufficient(self.method(), self.lookback.max(1), n);
        }
        let momentum: f64 = input.series[n - self.lookback..].iter().map(|o| o.returns).sum();

        PredictionResult::new(
            self.method(),
            sign(momentum),
            (momentum.abs() * 10.0).min(0.8),
            format!("Sum of last {} returns {:.4}", self.lookback, momentum),
        )
    }
}

/// Directional reading of the consensus score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outlook {
    /// Consensus above the threshold
    Bullish,
    /// Consensus below the negative threshold
    Bearish,
    /// Consensus within the threshold
    Neutral,
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outlook::Bullish => "Bullish",
            Outlook::Bearish => "Bearish",
            Outlook::Neutral => "Neutral",
        };
        f.write_str(name)
    }
}

/// Confidence-weighted ensemble direction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Consensus {
    /// `Σ(direction · confidence) / Σ confidence`, 0 when no confidence
    pub score: f64,
    /// Classified score
    pub outlook: Outlook,
}

/// Combine predictions into a consensus.
///
/// # Example
/// ```rust
/// use fractal_market::prediction::{ensemble_consensus, Outlook};
///
/// let consensus = ensemble_consensus(&[]);
/// assert_eq!(consensus.score, 0.0);
/// assert_eq!(consensus.outlook, Outlook::Neutral);
/// ```
pub fn ensemble_consensus(predictions: &[PredictionResult]) -> Consensus {
    let total_confidence: f64 = predictions.iter().map(|p| p.confidence).sum();
    let score = if total_confidence > 0.0 {
        predictions
            .iter()
            .map(|p| p.predicted_direction * p.confidence)
            .sum::<f64>()
            / total_confidence
    } else {
        0.0
    };

    let outlook = if score > CONSENSUS_THRESHOLD {
        Outlook::Bullish
    } else if score < -CONSENSUS_THRESHOLD {
        Outlook::Bearish
    } else {
        Outlook::Neutral
    };

    Consensus { score, outlook }
}

/// An ordered set of heuristics run over one input.
pub struct EnsemblePredictor {
    heuristics: Vec<Box<dyn PredictionHeuristic>>,
}

impl Default for EnsemblePredictor {
    fn default() -> Self {
        Self::standard()
    }
}

impl EnsemblePredictor {
    /// Empty ensemble.
    pub fn new() -> Self {
        Self {
            heuristics: Vec::new(),
        }
    }

    /// The five reference heuristics in their fixed order.
    pub fn standard() -> Self {
        Self::new()
            .with(TrendFollowing::default())
            .with(MeanReversion::default())
            .with(FractalPatternSignal)
            .with(VolatilitySignal::default())
            .with(MomentumSignal::default())
    }

    /// Append a heuristic.
    pub fn with<H: PredictionHeuristic + 'static>(mut self, heuristic: H) -> Self {
        self.heuristics.push(Box::new(heuristic));
        self
    }

    /// Number of heuristics.
    pub fn len(&self) -> usize {
        self.heuristics.len()
    }

    /// True when no heuristics are registered.
    pub fn is_empty(&self) -> bool {
        self.heuristics.is_empty()
    }

    /// One prediction per heuristic, in registration order.
    pub fn predict(&self, input: &PredictionInput<'_>) -> Vec<PredictionResult> {
        let predictions: Vec<PredictionResult> =
            self.heuristics.iter().map(|h| h.predict(input)).collect();
        log::debug!(
            "Ensemble produced {} predictions over {} observations",
            predictions.len(),
            input.series.len()
        );
        predictions
    }
}

/// Run the five reference heuristics.
pub fn generate_predictions(input: &PredictionInput<'_>) -> Vec<PredictionResult> {
    EnsemblePredictor::standard().predict(input)
}
