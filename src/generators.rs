//! Synthetic market series generation.
//!
//! Prices follow geometric Brownian motion whose shocks are perturbed by a
//! multi-octave noise term. Each octave mixes a sine at the octave frequency
//! with a golden-ratio-detuned harmonic and scales it by a fresh Gaussian draw,
//! so the noise carries structure at several time scales at once.
//!
//! ## Per-step update
//!
//! ```text
//! noise  = Σ_o  amp_o * (sin(φ_o) + 0.5 sin(φ_o * GOLDEN_RATIO)) * N(0,1) * noise_gain
//! φ_o    = (i * freq_o * phase_step) mod 2π,   freq_o = 2^o,   amp_o = decay^o
//! decay  = 0.5^(fractal_dimension_bias - 1)
//! dP     = drift + volatility * (rnd + noise_scale * noise)
//! price *= 1 + dP
//! ```

use crate::errors::{
    validate_finite, validate_nonzero, validate_parameter, validate_positive, FractalResult,
};
use crate::random_stream::RandomStream;
use chrono::{DateTime, Duration, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Golden ratio used to detune the second harmonic of each octave.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Lowest price the generator will emit.
///
/// A multiplicative step of `1 + dP <= 0` would otherwise drive the price to
/// zero or below under extreme drift/volatility settings.
pub const MIN_PRICE: f64 = 1e-8;

/// One point of a market series.
///
/// `returns` and `volatility` are zero as generated and are filled in by
/// [`crate::statistics::compute_returns_and_volatility`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Price level
    pub price: f64,
    /// Traded volume
    pub volume: f64,
    /// Fractional change from the previous price (0 for the first point)
    pub returns: f64,
    /// Rolling standard deviation of trailing returns
    pub volatility: f64,
}

impl Observation {
    /// New observation with statistics not yet computed.
    pub fn new(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
            returns: 0.0,
            volatility: 0.0,
        }
    }
}

/// Parameters of the synthetic market model.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarketSeriesConfig {
    /// Deterministic drift per step
    pub drift: f64,
    /// Shock scale per step
    pub volatility: f64,
    /// Controls octave amplitude decay: `0.5^(bias - 1)` per octave
    pub fractal_dimension_bias: f64,
    /// Number of noise octaves
    pub octaves: usize,
    /// Weight of the octave noise relative to the primary shock
    pub noise_scale: f64,
    /// Phase advance per step at the base frequency
    pub phase_step: f64,
    /// Gain applied to every octave contribution
    pub noise_gain: f64,
    /// Volume floor
    pub base_volume: f64,
    /// Volume added per unit of absolute primary shock
    pub volume_sensitivity: f64,
    /// Seed used by [`generate_seeded_series`]
    pub seed: u64,
    /// Instant the series ends at; `None` means the current time
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for MarketSeriesConfig {
    fn default() -> Self {
        Self {
            drift: 0.00005,
            volatility: 0.015,
            fractal_dimension_bias: 1.5,
            octaves: 5,
            noise_scale: 0.3,
            phase_step: 0.1,
            noise_gain: 0.1,
            base_volume: 1000.0,
            volume_sensitivity: 500.0,
            seed: 42,
            reference_time: None,
        }
    }
}

impl MarketSeriesConfig {
    /// Configuration that produces a constant price path.
    pub fn flat() -> Self {
        Self {
            drift: 0.0,
            volatility: 0.0,
            noise_scale: 0.0,
            ..Self::default()
        }
    }

    /// Per-octave amplitude multiplier.
    pub fn amplitude_decay(&self) -> f64 {
        0.5_f64.powf(self.fractal_dimension_bias - 1.0)
    }

    fn validate(&self) -> FractalResult<()> {
        validate_finite(self.drift, "drift")?;
        validate_parameter(self.volatility, 0.0, f64::MAX, "volatility")?;
        validate_finite(self.fractal_dimension_bias, "fractal_dimension_bias")?;
        validate_nonzero(self.octaves, "octaves")?;
        validate_parameter(self.noise_scale, 0.0, f64::MAX, "noise_scale")?;
        validate_finite(self.phase_step, "phase_step")?;
        validate_finite(self.noise_gain, "noise_gain")?;
        validate_parameter(self.base_volume, 0.0, f64::MAX, "base_volume")?;
        validate_parameter(self.volume_sensitivity, 0.0, f64::MAX, "volume_sensitivity")?;
        Ok(())
    }
}

/// Multi-octave noise value for step `step`.
///
/// Draws exactly `config.octaves` Gaussians from `rng`.
pub fn octave_noise(step: usize, config: &MarketSeriesConfig, rng: &mut RandomStream) -> f64 {
    let decay = config.amplitude_decay();
    let mut noise = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;

    for _ in 0..config.octaves {
        let phase = (step as f64 * frequency * config.phase_step) % (2.0 * PI);
        let wave = phase.sin() + 0.5 * (phase * GOLDEN_RATIO).sin();
        noise += amplitude * wave * rng.gaussian() * config.noise_gain;
        amplitude *= decay;
        frequency *= 2.0;
    }

    noise
}

/// Generate `length` observations starting from `initial_price`.
///
/// Timestamps are spaced one hour apart and end one hour before
/// `config.reference_time` (or now). `returns` and `volatility` are left at
/// zero.
///
/// # Errors
/// Returns an error if `length == 0`, `initial_price` is not a positive finite
/// number, or any model parameter is out of range.
///
/// # Example
/// ```rust
/// use fractal_market::generators::{generate_market_series, MarketSeriesConfig};
/// use fractal_market::random_stream::RandomStream;
///
/// let mut rng = RandomStream::with_seed(42);
/// let series = generate_market_series(&mut rng, 100, 100.0, &MarketSeriesConfig::default()).unwrap();
/// assert_eq!(series.len(), 100);
/// assert!(series.iter().all(|o| o.price > 0.0));
/// ```
pub fn generate_market_series(
    rng: &mut RandomStream,
    length: usize,
    initial_price: f64,
    config: &MarketSeriesConfig,
) -> FractalResult<Vec<Observation>> {
    validate_nonzero(length, "length")?;
    validate_positive(initial_price, "initial_price")?;
    config.validate()?;

    let reference = config.reference_time.unwrap_or_else(Utc::now);
    let start = reference - Duration::hours(length as i64);

    let mut series = Vec::with_capacity(length);
    let mut price = initial_price;
    let mut floor_hits = 0usize;

    for i in 0..length {
        let noise = octave_noise(i, config, rng);
        let rnd = rng.gaussian();
        let price_change = config.drift + config.volatility * (rnd + config.noise_scale * noise);

        price *= 1.0 + price_change;
        if price.is_nan() || price < MIN_PRICE {
            price = MIN_PRICE;
            floor_hits += 1;
        }

        let volume = config.base_volume + rnd.abs() * config.volume_sensitivity;
        let timestamp = start + Duration::hours(i as i64);
        series.push(Observation::new(timestamp, price, volume));
    }

    if floor_hits > 0 {
        log::warn!(
            "Price clamped at floor {} on {} of {} steps (drift={}, volatility={})",
            MIN_PRICE,
            floor_hits,
            length,
            config.drift,
            config.volatility
        );
    }
    log::debug!(
        "Generated {} observations: {:.4} -> {:.4}",
        length,
        initial_price,
        price
    );

    Ok(series)
}

/// Generate a series from a fresh stream seeded with `config.seed`.
pub fn generate_seeded_series(
    length: usize,
    initial_price: f64,
    config: &MarketSeriesConfig,
) -> FractalResult<Vec<Observation>> {
    let mut rng = RandomStream::with_seed(config.seed);
    generate_market_series(&mut rng, length, initial_price, config)
}

/// Extract the price column of a series.
pub fn prices_of(series: &[Observation]) -> Vec<f64> {
    series.iter().map(|o| o.price).collect()
}
