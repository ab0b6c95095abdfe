//! Edge case and numerical stability tests across modules.
//!
//! Covers the reference scenarios (flat series, DTW identity, ramp
//! classification, momentum) and the structural properties every estimator
//! must keep on arbitrary input.

use assert_approx_eq::assert_approx_eq;
use fractal_market::*;

fn walk(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = RandomStream::with_seed(seed);
    let mut level = 100.0;
    (0..n)
        .map(|_| {
            level *= 1.0 + 0.01 * rng.gaussian();
            level
        })
        .collect()
}

mod reference_scenarios {
    use super::*;

    #[test]
    fn test_flat_series() {
        let series = generate_seeded_series(50, 100.0, &MarketSeriesConfig::flat()).unwrap();
        assert!(series.iter().all(|o| o.price == 100.0));
        assert_eq!(estimate_fractal_dimension(&prices_of(&series)), 1.0);
    }

    #[test]
    fn test_seed_42_ten_points() {
        let config = MarketSeriesConfig {
            drift: 0.00005,
            volatility: 0.015,
            ..MarketSeriesConfig::default()
        };
        let a = prices_of(&generate_seeded_series(10, 100.0, &config).unwrap());
        let b = prices_of(&generate_seeded_series(10, 100.0, &config).unwrap());
        assert_eq!(a.len(), 10);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dtw_identity_scenario() {
        let a = [0.0, 0.5, 1.0];
        assert_eq!(dtw_distance(&a, &a), 0.0);
        assert_eq!(dtw_similarity(&a, &a), 1.0);
    }

    #[test]
    fn test_ramp_classification() {
        let ramp: Vec<f64> = (0..30).map(|i| i as f64 / 29.0).collect();
        for d in [1.3, 1.45, 1.6, 1.7] {
            assert_eq!(classify_pattern(d, &ramp), PatternType::UpwardFractal);
        }
    }

    #[test]
    fn test_momentum_scenario() {
        assert_approx_eq!(momentum(&[0.01, 0.01, 0.01, 0.01, 0.01]), 0.5, 1e-12);
    }
}

mod structural_properties {
    use super::*;

    #[test]
    fn test_dimension_finite_on_varied_input() {
        for seed in 0..10 {
            for n in [4, 5, 16, 64, 500] {
                let d = estimate_fractal_dimension(&walk(seed, n));
                assert!(d.is_finite(), "seed {} n {} gave {}", seed, n, d);
            }
        }
    }

    #[test]
    fn test_box_counts_non_increasing() {
        for seed in 0..10 {
            let prices = walk(seed, 777);
            let counts = box_counts(&prices, &BoxCountingConfig::default());
            for pair in counts.windows(2) {
                assert!(pair[0].box_size < pair[1].box_size);
                assert!(pair[1].count <= pair[0].count);
            }
        }
    }

    #[test]
    fn test_dimension_scale_invariant() {
        // Doubling is exact in floating point, so normalisation is unchanged
        let prices = walk(3, 256);
        let doubled: Vec<f64> = prices.iter().map(|p| p * 2.0).collect();
        assert_eq!(
            estimate_fractal_dimension(&prices),
            estimate_fractal_dimension(&doubled)
        );
    }

    #[test]
    fn test_dtw_symmetry_exact() {
        let a = walk(1, 40);
        let b = walk(2, 55);
        assert_eq!(dtw_similarity(&a, &b), dtw_similarity(&b, &a));
    }

    #[test]
    fn test_volatility_non_negative() {
        let mut series = generate_seeded_series(300, 100.0, &MarketSeriesConfig::default()).unwrap();
        for window in [1, 2, 10, 30, 400] {
            compute_returns_and_volatility(&mut series, window).unwrap();
            assert!(series.iter().all(|o| o.volatility >= 0.0));
        }
    }

    #[test]
    fn test_prices_stay_positive_under_stress() {
        let config = MarketSeriesConfig {
            drift: -0.2,
            volatility: 1.5,
            noise_scale: 2.0,
            ..MarketSeriesConfig::default()
        };
        let series = generate_seeded_series(1000, 1.0, &config).unwrap();
        assert!(series.iter().all(|o| o.price >= MIN_PRICE && o.price.is_finite()));
    }

    #[test]
    fn test_random_stream_open_interval() {
        let mut rng = RandomStream::with_seed(0);
        for _ in 0..10_000 {
            let u = rng.uniform();
            assert!(u > 0.0 && u < 1.0);
        }
    }

    #[test]
    fn test_confidence_bounds_across_seeds() {
        let analyzer = FractalMarketAnalyzer::new();
        for seed in [1, 2, 3] {
            let report = analyzer
                .generate_and_analyze(seed, 400, 100.0, &MarketSeriesConfig::default())
                .unwrap();
            for p in &report.patterns {
                assert!((0.0..=1.0).contains(&p.confidence));
            }
            for p in &report.predictions {
                assert!((0.0..=1.0).contains(&p.confidence));
                assert!((-1.0..=1.0).contains(&p.predicted_direction));
            }
        }
    }

    #[test]
    fn test_tiny_series_through_pipeline() {
        let analyzer = FractalMarketAnalyzer::new();
        let report = analyzer
            .generate_and_analyze(5, 3, 100.0, &MarketSeriesConfig::default())
            .unwrap();
        assert_eq!(report.summary.fractal_dimension, 1.0);
        assert!(report.patterns.is_empty());
        let behavior = report.behavior.unwrap();
        assert!(behavior.trend_periods.is_empty());
        assert!(behavior.volatility_clusters.is_empty());
        assert!(report.predictions.iter().all(|p| p.confidence == 0.0));
    }
}
