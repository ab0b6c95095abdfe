//! # Analysis Results Structures
//!
//! Plain records bundling everything one analysis pass produced. Export and
//! display layers read these directly; nothing here is recomputed lazily.

use crate::behavior::BehaviorAnalysis;
use crate::config::AnalysisDepth;
use crate::generators::Observation;
use crate::patterns::Pattern;
use crate::prediction::{Consensus, PredictionResult};
use crate::window_analysis::WindowDimension;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Headline figures for one series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionSummary {
    /// Number of observations
    pub points: usize,
    /// First price
    pub start_price: f64,
    /// Last price
    pub end_price: f64,
    /// `(end − start) / start`
    pub total_return: f64,
    /// Box-counting dimension of the whole series
    pub fractal_dimension: f64,
    /// Dimensions over the standard windows (empty when disabled)
    pub window_dimensions: Vec<WindowDimension>,
}

impl SessionSummary {
    /// Summarise a series. An empty series yields zeros.
    pub fn from_series(
        series: &[Observation],
        fractal_dimension: f64,
        window_dimensions: Vec<WindowDimension>,
    ) -> Self {
        let start_price = series.first().map_or(0.0, |o| o.price);
        let end_price = series.last().map_or(0.0, |o| o.price);
        let total_return = if start_price > 0.0 {
            (end_price - start_price) / start_price
        } else {
            0.0
        };

        Self {
            points: series.len(),
            start_price,
            end_price,
            total_return,
            fractal_dimension,
            window_dimensions,
        }
    }
}

/// Complete results from one analysis pass
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisReport {
    /// Depth the pass ran at
    pub depth: AnalysisDepth,
    /// Series with returns and volatility filled in
    pub series: Vec<Observation>,
    /// Headline figures
    pub summary: SessionSummary,
    /// Detected patterns, most confident first
    pub patterns: Vec<Pattern>,
    /// Behaviour analysis, if enabled
    pub behavior: Option<BehaviorAnalysis>,
    /// One prediction per heuristic, if enabled
    pub predictions: Vec<PredictionResult>,
    /// Confidence-weighted consensus of `predictions`
    pub consensus: Option<Consensus>,
}

impl AnalysisReport {
    /// Highest-confidence pattern, if any.
    pub fn strongest_pattern(&self) -> Option<&Pattern> {
        self.patterns.first()
    }

    /// Price column of the analysed series.
    pub fn prices(&self) -> Vec<f64> {
        self.series.iter().map(|o| o.price).collect()
    }
}
