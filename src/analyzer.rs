//! # Fractal Market Analyzer
//!
//! [`FractalMarketAnalyzer`] is the entry point that runs the full pipeline
//! over a series:
//!
//! ```text
//! generation -> returns/volatility -> window dimensions
//!            -> patterns -> behaviour -> predictions -> consensus
//! ```
//!
//! Each stage is a pure function of the series and the stages before it. The
//! analyzer can run one-off passes ([`FractalMarketAnalyzer::analyze`],
//! [`FractalMarketAnalyzer::generate_and_analyze`]) or keep a set of named
//! series and their reports, analysing them all at once (in parallel with the
//! `parallel` feature).
//!
//! ## Usage Example
//!
//! ```rust
//! use fractal_market::{FractalMarketAnalyzer, MarketSeriesConfig};
//!
//! # fn main() -> Result<(), fractal_market::FractalMarketError> {
//! let analyzer = FractalMarketAnalyzer::new();
//! let report = analyzer.generate_and_analyze(42, 500, 100.0, &MarketSeriesConfig::default())?;
//!
//! assert_eq!(report.summary.points, 500);
//! for prediction in &report.predictions {
//!     println!("{}: {:+.0} ({:.2})", prediction.method,
//!         prediction.predicted_direction, prediction.confidence);
//! }
//! # Ok(())
//! # }
//! ```

use crate::behavior::{analyze_behavior, BehaviorConfig};
use crate::config::AnalysisConfig;
use crate::errors::{validate_all_finite, FractalMarketError, FractalResult};
use crate::fractal_dimension::estimate_fractal_dimension_with_config;
use crate::generators::{generate_market_series, prices_of, MarketSeriesConfig, Observation};
use crate::patterns::detect_fractal_patterns;
use crate::prediction::{ensemble_consensus, EnsemblePredictor, PredictionInput};
use crate::random_stream::RandomStream;
use crate::results::{AnalysisReport, SessionSummary};
use crate::statistics::compute_returns_and_volatility;
use crate::window_analysis::{compute_window_dimensions, standard_windows};
use std::collections::BTreeMap;

/// Orchestrates every analysis layer over one or more named series.
pub struct FractalMarketAnalyzer {
    /// Raw series keyed by name (deterministic ordering)
    series_data: BTreeMap<String, Vec<Observation>>,
    /// Reports from the last analysis of each series
    reports: BTreeMap<String, AnalysisReport>,
    /// Layers and parameters
    analysis_config: AnalysisConfig,
    /// Prediction heuristics
    ensemble: EnsemblePredictor,
}

impl FractalMarketAnalyzer {
    /// Create an analyzer with the standard configuration
    pub fn new() -> Self {
        Self {
            series_data: BTreeMap::new(),
            reports: BTreeMap::new(),
            analysis_config: AnalysisConfig::default(),
            ensemble: EnsemblePredictor::standard(),
        }
    }

    /// Create an analyzer with an explicit configuration
    pub fn with_config(config: AnalysisConfig) -> FractalResult<Self> {
        config.validate()?;
        Ok(Self {
            analysis_config: config,
            ..Self::new()
        })
    }

    /// Replace the configuration; cached reports are kept until re-analysed
    pub fn set_analysis_config(&mut self, config: AnalysisConfig) -> FractalResult<()> {
        config.validate()?;
        self.analysis_config = config;
        Ok(())
    }

    /// Current configuration
    pub fn analysis_config(&self) -> &AnalysisConfig {
        &self.analysis_config
    }

    /// Replace the prediction heuristics
    pub fn set_ensemble(&mut self, ensemble: EnsemblePredictor) {
        self.ensemble = ensemble;
    }

    /// Register a series under `name`.
    ///
    /// # Returns
    /// Ok(true) if a new series was inserted, Ok(false) if an existing series was replaced
    pub fn add_series(&mut self, name: &str, series: Vec<Observation>) -> FractalResult<bool> {
        validate_series(&series)?;
        let is_new = self.series_data.insert(name.to_string(), series).is_none();
        self.reports.remove(name);
        log::debug!(
            "{} series '{}'",
            if is_new { "Added" } else { "Replaced" },
            name
        );
        Ok(is_new)
    }

    /// Generate a series with `rng` and register it under `name`
    pub fn add_generated_series(
        &mut self,
        name: &str,
        rng: &mut RandomStream,
        length: usize,
        initial_price: f64,
        config: &MarketSeriesConfig,
    ) -> FractalResult<bool> {
        let series = generate_market_series(rng, length, initial_price, config)?;
        self.add_series(name, series)
    }

    /// Remove a series and its report.
    ///
    /// # Returns
    /// true if the series existed
    pub fn remove_series(&mut self, name: &str) -> bool {
        self.reports.remove(name);
        self.series_data.remove(name).is_some()
    }

    /// Names of registered series in sorted order
    pub fn series_names(&self) -> Vec<String> {
        self.series_data.keys().cloned().collect()
    }

    /// Analyse one registered series and cache its report
    pub fn analyze_series(&mut self, name: &str) -> FractalResult<&AnalysisReport> {
        let series = self
            .series_data
            .get(name)
            .cloned()
            .ok_or_else(|| FractalMarketError::SeriesNotFound {
                name: name.to_string(),
            })?;
        let report = self.analyze(series)?;
        self.reports.insert(name.to_string(), report);
        self.get_analysis_results(name)
    }

    /// Analyse every registered series.
    ///
    /// A series that fails is logged and skipped; the error of the first
    /// failure is returned after every other series has been stored.
    pub fn analyze_all_series(&mut self) -> FractalResult<()> {
        let names = self.series_names();

        let outcomes: Vec<(String, FractalResult<AnalysisReport>)> = {
            let run = |name: &String| {
                let outcome = match self.series_data.get(name) {
                    Some(series) => self.analyze(series.clone()),
                    None => Err(FractalMarketError::SeriesNotFound { name: name.clone() }),
                };
                (name.clone(), outcome)
            };

            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                names.par_iter().map(run).collect()
            }
            #[cfg(not(feature = "parallel"))]
            {
                names.iter().map(run).collect()
            }
        };

        let mut first_error = None;
        for (name, outcome) in outcomes {
            match outcome {
                Ok(report) => {
                    self.reports.insert(name, report);
                }
                Err(e) => {
                    log::warn!("Analysis of series '{}' failed: {}", name, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        log::info!(
            "Analysed {} series, {} reports available",
            names.len(),
            self.reports.len()
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Report from the last analysis of `name`
    pub fn get_analysis_results(&self, name: &str) -> FractalResult<&AnalysisReport> {
        self.reports
            .get(name)
            .ok_or_else(|| FractalMarketError::SeriesNotFound {
                name: name.to_string(),
            })
    }

    /// Generate a series from `seed` and analyse it.
    ///
    /// The seed overrides `config.seed`.
    pub fn generate_and_analyze(
        &self,
        seed: u64,
        length: usize,
        initial_price: f64,
        config: &MarketSeriesConfig,
    ) -> FractalResult<AnalysisReport> {
        let mut rng = RandomStream::with_seed(seed);
        let series = generate_market_series(&mut rng, length, initial_price, config)?;
        self.analyze(series)
    }

    /// Run every enabled layer over a series.
    ///
    /// `returns` and `volatility` are (re)computed from the prices.
    ///
    /// # Errors
    /// Rejects an empty series, non-finite or non-positive prices, and invalid
    /// configuration.
    pub fn analyze(&self, mut series: Vec<Observation>) -> FractalResult<AnalysisReport> {
        let config = &self.analysis_config;
        config.validate()?;
        validate_series(&series)?;

        compute_returns_and_volatility(&mut series, config.volatility_window)?;

        let prices = prices_of(&series);
        let fractal_dimension = estimate_fractal_dimension_with_config(&prices, &config.box_counting);

        let window_dimensions = if config.enable_window_summary {
            compute_window_dimensions(&prices, &standard_windows(prices.len()), &config.box_counting)
        } else {
            Vec::new()
        };

        let patterns = if config.enable_pattern_detection {
            detect_fractal_patterns(&series, &config.patterns)?
        } else {
            Vec::new()
        };

        let behavior = if config.enable_behavior_analysis {
            let behavior_config = BehaviorConfig {
                volatility_window: config.volatility_window,
                ..config.behavior.clone()
            };
            Some(analyze_behavior(&series, &behavior_config)?)
        } else {
            None
        };

        let (predictions, consensus) = if config.enable_predictions {
            let input = PredictionInput {
                series: &series,
                patterns: &patterns,
                volatility_window: config.volatility_window,
            };
            let predictions = self.ensemble.predict(&input);
            let consensus = ensemble_consensus(&predictions);
            (predictions, Some(consensus))
        } else {
            (Vec::new(), None)
        };

        let summary = SessionSummary::from_series(&series, fractal_dimension, window_dimensions);

        log::info!(
            "Analysed {} points: D = {:.4}, {} patterns, return {:+.2}%{}",
            summary.points,
            summary.fractal_dimension,
            patterns.len(),
            summary.total_return * 100.0,
            consensus
                .map(|c| format!(", outlook {} ({:+.3})", c.outlook, c.score))
                .unwrap_or_default()
        );

        Ok(AnalysisReport {
            depth: config.depth,
            series,
            summary,
            patterns,
            behavior,
            predictions,
            consensus,
        })
    }
}

impl Default for FractalMarketAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_series(series: &[Observation]) -> FractalResult<()> {
    if series.is_empty() {
        return Err(FractalMarketError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    let prices = prices_of(series);
    validate_all_finite(&prices, "prices")?;
    if let Some((i, &p)) = prices.iter().enumerate().find(|(_, &p)| p <= 0.0) {
        return Err(FractalMarketError::InvalidParameter {
            parameter: format!("prices[{}]", i),
            value: p,
            constraint: "> 0".to_string(),
        });
    }
    Ok(())
}
