//! # Fractal Market Analysis
//!
//! Box-counting fractal analysis of synthetic market series.
//!
//! This crate generates reproducible price series from geometric Brownian
//! motion perturbed by multi-octave noise, and analyses them with a
//! box-counting fractal-dimension estimator, DTW self-similarity, sliding-window
//! pattern detection, trend and volatility-cluster detection, and a heuristic
//! prediction ensemble. The estimator is a simplified variant meant for
//! comparing windows, not for statistical inference, and the ensemble makes no
//! claim of predictive validity.
//!
//! ## Key Features
//!
//! - **Reproducible Generation**: every stochastic step draws from an explicit
//!   seeded [`RandomStream`]
//! - **Box Counting**: full path coverage with dyadic box sizes
//! - **Pattern Detection**: dimension-filtered windows scored by DTW
//!   self-similarity
//! - **Behaviour Analytics**: trend periods, volatility clusters, momentum and
//!   mean reversion
//! - **Ensemble Prediction**: five weak heuristics and a weighted consensus
//! - **Window Fan-Out**: dimensions over named windows, in parallel with the
//!   `parallel` feature
//! - **Streaming**: trailing-window monitoring of a live feed
//!
//! ## Quick Start
//!
//! ```rust
//! use fractal_market::{FractalMarketAnalyzer, MarketSeriesConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = FractalMarketAnalyzer::new();
//!     let report = analyzer.generate_and_analyze(42, 1000, 100.0, &MarketSeriesConfig::default())?;
//!
//!     println!("D = {:.3}", report.summary.fractal_dimension);
//!     for pattern in report.patterns.iter().take(3) {
//!         println!("{} [{}..={}] conf {:.2}", pattern.pattern_type,
//!             pattern.start_index, pattern.end_index, pattern.confidence);
//!     }
//!     if let Some(consensus) = report.consensus {
//!         println!("Outlook: {} ({:+.3})", consensus.outlook, consensus.score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is organised around the [`FractalMarketAnalyzer`], which runs
//! every layer in order. Each layer is also usable on its own:
//! [`generators`], [`statistics`], [`fractal_dimension`], [`similarity`],
//! [`patterns`], [`behavior`], [`prediction`], [`window_analysis`] and
//! [`streaming`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod analyzer;
pub mod config;
pub mod errors;
pub mod math_utils;
pub mod random_stream;
pub mod results;

// Analysis layers
pub mod behavior;
pub mod fractal_dimension;
pub mod generators;
pub mod patterns;
pub mod prediction;
pub mod similarity;
pub mod statistics;
pub mod streaming;
pub mod window_analysis;

// Re-exports for convenience - main public API
pub use analyzer::FractalMarketAnalyzer;
pub use config::{AnalysisConfig, AnalysisDepth};
pub use errors::{FractalMarketError, FractalResult};
pub use random_stream::RandomStream;
pub use results::{AnalysisReport, SessionSummary};

// Generation and statistics exports
pub use generators::{
    generate_market_series, generate_seeded_series, prices_of, MarketSeriesConfig, Observation,
    GOLDEN_RATIO, MIN_PRICE,
};
pub use statistics::{
    compute_returns, compute_returns_and_volatility, compute_rolling_volatility,
    DEFAULT_VOLATILITY_WINDOW,
};

// Fractal dimension and similarity exports
pub use fractal_dimension::{
    box_counting, box_counts, estimate_fractal_dimension, estimate_fractal_dimension_with_config,
    BoxCount, BoxCountingConfig, BoxCountingResult,
};
pub use similarity::{dtw_distance, dtw_similarity, max_similarity};

// Pattern, behaviour and prediction exports
pub use behavior::{
    analyze_behavior, detect_trend_periods, detect_volatility_clusters, mean_reversion_tendency,
    momentum, overall_trend, volatility_clustering_index, BehaviorAnalysis, BehaviorConfig,
    MarketBias, OverallTrend, TrendDirection, TrendPeriod, VolatilityCluster,
};
pub use patterns::{
    classify_pattern, detect_fractal_patterns, Pattern, PatternDetectionConfig, PatternType,
};
pub use prediction::{
    ensemble_consensus, generate_predictions, Consensus, EnsemblePredictor, Outlook,
    PredictionHeuristic, PredictionInput, PredictionMethod, PredictionResult,
};

// Window and streaming exports
pub use streaming::{
    StreamingConfig, StreamingFractalMonitor, StreamingPattern, TradeSignal,
};
pub use window_analysis::{
    compute_window_dimensions, standard_windows, FractalWindow, WindowDimension,
};
