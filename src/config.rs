//! # Analysis Configuration
//!
//! Controls which analysis layers run over a series and with which
//! parameters. Presets mirror how far a pass goes: `light` stops at the
//! statistics and window dimensions, `standard` adds patterns, behaviour and
//! predictions.

use crate::behavior::BehaviorConfig;
use crate::errors::{validate_nonzero, FractalResult};
use crate::fractal_dimension::BoxCountingConfig;
use crate::patterns::PatternDetectionConfig;
use crate::statistics::DEFAULT_VOLATILITY_WINDOW;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for controlling which analysis components to run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Rolling volatility window
    pub volatility_window: usize,
    /// Pattern detector parameters
    pub patterns: PatternDetectionConfig,
    /// Behaviour analyzer parameters
    pub behavior: BehaviorConfig,
    /// Box sizes for the window summary
    pub box_counting: BoxCountingConfig,
    /// Run the pattern detector
    pub enable_pattern_detection: bool,
    /// Run the behaviour analyzer
    pub enable_behavior_analysis: bool,
    /// Run the prediction ensemble
    pub enable_predictions: bool,
    /// Estimate dimensions over the standard windows
    pub enable_window_summary: bool,
    /// Analysis depth preset
    pub depth: AnalysisDepth,
}

/// Analysis depth presets for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalysisDepth {
    /// Light: statistics and window dimensions only
    Light,
    /// Standard: every analysis layer (default)
    Standard,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnalysisConfig {
    /// Light configuration: returns, volatility and window dimensions
    pub fn light() -> Self {
        Self {
            enable_pattern_detection: false,
            enable_behavior_analysis: false,
            enable_predictions: false,
            enable_window_summary: true,
            depth: AnalysisDepth::Light,
            ..Self::standard()
        }
    }

    /// Standard configuration: every layer with reference parameters
    pub fn standard() -> Self {
        Self {
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            patterns: PatternDetectionConfig::default(),
            behavior: BehaviorConfig::default(),
            box_counting: BoxCountingConfig::default(),
            enable_pattern_detection: true,
            enable_behavior_analysis: true,
            enable_predictions: true,
            enable_window_summary: true,
            depth: AnalysisDepth::Standard,
        }
    }

    /// Check every nested configuration.
    ///
    /// The behaviour analyzer reads volatility computed with
    /// `volatility_window`, so the two are kept in step.
    pub fn validate(&self) -> FractalResult<()> {
        validate_nonzero(self.volatility_window, "volatility_window")?;
        if self.enable_pattern_detection {
            self.patterns.validate()?;
        }
        if self.enable_behavior_analysis {
            self.behavior.validate()?;
        }
        Ok(())
    }

    /// Set the volatility window for both the statistics and behaviour layers
    pub fn with_volatility_window(mut self, window: usize) -> Self {
        self.volatility_window = window;
        self.behavior.volatility_window = window;
        self
    }

    /// Check if pattern detection is enabled
    pub fn is_pattern_detection_enabled(&self) -> bool {
        self.enable_pattern_detection
    }

    /// Check if behaviour analysis is enabled
    pub fn is_behavior_analysis_enabled(&self) -> bool {
        self.enable_behavior_analysis
    }

    /// Check if predictions are enabled
    pub fn is_predictions_enabled(&self) -> bool {
        self.enable_predictions
    }

    /// Get the analysis depth
    pub fn depth(&self) -> AnalysisDepth {
        self.depth
    }
}
