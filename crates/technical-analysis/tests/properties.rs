//! Property tests for the technical signal pipeline.
//!
//! 1. Confidence stays within 0..=100 for any signal mix
//! 2. Every analyzer yields exactly one signal with strength 1..=5
//! 3. Identical input always produces identical output

use analysis_core::{IndicatorSeries, Polarity, Precision, TechnicalSignal};
use proptest::prelude::*;
use technical_analysis::{
    aggregate_recommendation, aggregate_recommendation_with, analyze_alignment, analyze_momentum,
    analyze_oscillator_zone, TechnicalAnalysisEngine,
};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_polarity() -> impl Strategy<Value = Polarity> {
    prop_oneof![
        Just(Polarity::Bullish),
        Just(Polarity::Bearish),
        Just(Polarity::Neutral),
    ]
}

fn arb_signal() -> impl Strategy<Value = TechnicalSignal> {
    (arb_polarity(), 1u8..=5).prop_map(|(polarity, strength)| {
        TechnicalSignal::new("Prop", polarity, strength, "generated")
    })
}

fn arb_series(len: usize) -> impl Strategy<Value = IndicatorSeries> {
    let prices = prop::collection::vec(1.0..500.0_f64, len);
    let momentum = prop::collection::vec(-5.0..5.0_f64, len);
    let oscillator = prop::collection::vec(0.0..=100.0_f64, len);
    (
        prices.clone(),
        prices.clone(),
        prices.clone(),
        prices,
        momentum.clone(),
        momentum.clone(),
        momentum,
        oscillator,
    )
        .prop_map(|(f, m1, m2, s, line, signal, hist, osc)| IndicatorSeries {
            ema_fast: f,
            ema_mid1: m1,
            ema_mid2: m2,
            ema_slow: s,
            momentum_line: line,
            momentum_signal: signal,
            momentum_histogram: hist,
            oscillator: osc,
            as_of: None,
        })
}

fn arb_precision() -> impl Strategy<Value = Precision> {
    prop_oneof![Just(Precision::Detailed), Just(Precision::Badge)]
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn confidence_is_bounded(
        signals in prop::collection::vec(arb_signal(), 0..8),
        precision in arb_precision(),
    ) {
        let result = aggregate_recommendation_with(&signals, precision);
        prop_assert!((0.0..=100.0).contains(&result.confidence));
        prop_assert_eq!(result.signals.len(), signals.len());
    }

    #[test]
    fn aggregation_is_idempotent(signals in prop::collection::vec(arb_signal(), 0..8)) {
        prop_assert_eq!(aggregate_recommendation(&signals), aggregate_recommendation(&signals));
    }

    #[test]
    fn analyzers_always_produce_one_signal(series in arb_series(8), precision in arb_precision()) {
        for signal in [
            analyze_alignment(&series).unwrap(),
            analyze_momentum(&series).unwrap(),
            analyze_oscillator_zone(&series, precision).unwrap(),
        ] {
            prop_assert!((1..=5).contains(&signal.strength));
            prop_assert!(!signal.reason.is_empty());
        }
    }

    #[test]
    fn engine_is_idempotent(series in arb_series(10)) {
        let engine = TechnicalAnalysisEngine::new();
        let first = engine.recommend(&series).unwrap();
        let second = engine.recommend(&series).unwrap();
        prop_assert_eq!(first.overall, second.overall);
        prop_assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
        prop_assert_eq!(first.signals, second.signals);
        prop_assert!((0.0..=100.0).contains(&first.confidence));
    }

    #[test]
    fn oscillator_reason_embeds_value(value in 0.0..=100.0_f64, previous in 0.0..=100.0_f64) {
        let series = IndicatorSeries {
            oscillator: vec![previous, value],
            ..Default::default()
        };
        let signal = analyze_oscillator_zone(&series, Precision::Detailed).unwrap();
        let expected = format!("{:.1}", value);
        prop_assert!(signal.reason.contains(&expected));
    }
}
