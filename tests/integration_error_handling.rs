//! Integration tests for error handling at the public entry points
//!
//! Malformed configuration must be rejected up front with a descriptive
//! error; degenerate data must come back as sentinel values, never errors.

use fractal_market::*;

#[test]
fn test_generator_rejects_bad_arguments() {
    let config = MarketSeriesConfig::default();

    match generate_seeded_series(0, 100.0, &config) {
        Err(FractalMarketError::InvalidParameter { parameter, .. }) => {
            assert_eq!(parameter, "length");
        }
        other => panic!("Expected InvalidParameter for length, got {:?}", other),
    }

    match generate_seeded_series(10, -1.0, &config) {
        Err(FractalMarketError::InvalidParameter { parameter, value, .. }) => {
            assert_eq!(parameter, "initial_price");
            assert_eq!(value, -1.0);
        }
        other => panic!("Expected InvalidParameter for initial_price, got {:?}", other),
    }

    let bad = MarketSeriesConfig {
        drift: f64::INFINITY,
        ..MarketSeriesConfig::default()
    };
    assert!(generate_seeded_series(10, 100.0, &bad).is_err());

    let bad = MarketSeriesConfig {
        volatility: -0.1,
        ..MarketSeriesConfig::default()
    };
    assert!(generate_seeded_series(10, 100.0, &bad).is_err());
}

#[test]
fn test_detector_rejects_inconsistent_lengths() {
    let series = generate_seeded_series(200, 100.0, &MarketSeriesConfig::default()).unwrap();
    let config = PatternDetectionConfig {
        min_length: 50,
        max_length: 30,
        ..PatternDetectionConfig::default()
    };
    let err = detect_fractal_patterns(&series, &config).unwrap_err();
    assert!(matches!(err, FractalMarketError::InvalidConfiguration { .. }));
    assert!(err.to_string().contains("min_length"));

    let config = PatternDetectionConfig {
        min_length: 0,
        ..PatternDetectionConfig::default()
    };
    assert!(detect_fractal_patterns(&series, &config).is_err());

    let config = PatternDetectionConfig {
        top_k: 0,
        ..PatternDetectionConfig::default()
    };
    assert!(detect_fractal_patterns(&series, &config).is_err());
}

#[test]
fn test_volatility_window_zero_rejected() {
    let mut series = generate_seeded_series(50, 100.0, &MarketSeriesConfig::default()).unwrap();
    compute_returns(&mut series);
    assert!(compute_rolling_volatility(&mut series, 0).is_err());

    let config = AnalysisConfig::standard().with_volatility_window(0);
    assert!(FractalMarketAnalyzer::with_config(config).is_err());
}

#[test]
fn test_analyzer_rejects_bad_series() {
    let analyzer = FractalMarketAnalyzer::new();
    assert!(matches!(
        analyzer.analyze(Vec::new()),
        Err(FractalMarketError::InsufficientData { required: 1, actual: 0 })
    ));

    let mut series = generate_seeded_series(20, 100.0, &MarketSeriesConfig::default()).unwrap();
    series[5].price = f64::NAN;
    assert!(matches!(
        analyzer.analyze(series),
        Err(FractalMarketError::NumericalError { .. })
    ));

    let mut analyzer = FractalMarketAnalyzer::new();
    assert!(matches!(
        analyzer.analyze_series("missing"),
        Err(FractalMarketError::SeriesNotFound { .. })
    ));
}

#[test]
fn test_degenerate_data_returns_sentinels() {
    assert_eq!(estimate_fractal_dimension(&[]), 1.0);
    assert_eq!(estimate_fractal_dimension(&[1.0, 2.0, 3.0]), 1.0);
    assert_eq!(estimate_fractal_dimension(&[7.0; 64]), 1.0);

    assert_eq!(dtw_similarity(&[], &[0.5]), 0.0);
    assert_eq!(dtw_similarity(&[0.5], &[]), 0.0);

    let mut series = generate_seeded_series(10, 100.0, &MarketSeriesConfig::flat()).unwrap();
    compute_returns_and_volatility(&mut series, 1).unwrap();
    assert!(series.iter().all(|o| o.volatility == 0.0));

    let short = generate_seeded_series(10, 100.0, &MarketSeriesConfig::default()).unwrap();
    assert!(detect_fractal_patterns(&short, &PatternDetectionConfig::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_streaming_config_validation() {
    let config = StreamingConfig {
        window_sizes: vec![20, 0],
        ..StreamingConfig::default()
    };
    assert!(StreamingFractalMonitor::with_config(config).is_err());

    let config = StreamingConfig {
        risk_alert_threshold: 0.0,
        ..StreamingConfig::default()
    };
    assert!(StreamingFractalMonitor::with_config(config).is_err());
}
