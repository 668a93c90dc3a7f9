use analysis_core::{
    lookback, AnalysisError, DecisionTable, IndicatorSeries, Polarity, Precision, Rule,
    SignalAnalyzer, TechnicalSignal,
};
use tracing::debug;

use crate::validator::{require_periods, MIN_CROSSOVER_PERIODS};
use crate::verdict::Verdict;

pub const OSCILLATOR_INDICATOR: &str = "RSI Zone";

/// Latest oscillator value and its change since the previous period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorFacts {
    pub value: f64,
    pub delta: f64,
}

impl OscillatorFacts {
    pub fn new(value: f64, previous: f64) -> Self {
        Self {
            value,
            delta: value - previous,
        }
    }
}

/// Zone table behind the detail panel. Bounds are inclusive where written `<=`.
pub static DETAILED_ZONE_TABLE: DecisionTable<OscillatorFacts, Verdict> = DecisionTable {
    rows: DETAILED_ZONE_RULES,
    otherwise_name: "neutral",
    otherwise: Verdict::new(Polarity::Neutral, 2, "Neutral zone"),
};

const DETAILED_ZONE_RULES: &[Rule<OscillatorFacts, Verdict>] = &[
    Rule {
        name: "accumulation_surge",
        when: |f| (35.0..=55.0).contains(&f.value) && f.delta > 2.0,
        then: Verdict::new(Polarity::Bullish, 5, "Rising sharply out of the accumulation zone"),
    },
    Rule {
        name: "recovering",
        when: |f| (30.0..=50.0).contains(&f.value) && f.delta > 0.0,
        then: Verdict::new(Polarity::Bullish, 4, "Recovering from the lower band"),
    },
    Rule {
        name: "bullish_zone",
        when: |f| f.value > 50.0 && f.value <= 65.0,
        then: Verdict::new(Polarity::Bullish, 4, "Healthy bullish zone"),
    },
    Rule {
        name: "strong_zone",
        when: |f| f.value > 65.0 && f.value <= 70.0,
        then: Verdict::new(Polarity::Bullish, 3, "Strong, nearing overbought"),
    },
    Rule {
        name: "overbought",
        when: |f| f.value > 70.0 && f.value <= 80.0,
        then: Verdict::new(Polarity::Neutral, 2, "Overbought, momentum may stall"),
    },
    Rule {
        name: "extreme_overbought",
        when: |f| f.value > 80.0,
        then: Verdict::new(Polarity::Bearish, 3, "Extremely overbought, pullback risk"),
    },
    Rule {
        name: "oversold_falling",
        when: |f| f.value < 30.0 && f.delta <= 0.0,
        then: Verdict::new(Polarity::Bearish, 4, "Oversold and still falling"),
    },
    Rule {
        name: "oversold_turning",
        when: |f| f.value < 30.0 && f.delta > 0.0,
        then: Verdict::new(Polarity::Neutral, 2, "Oversold but turning up"),
    },
];

/// Coarse zone table behind the summary badge.
pub static BADGE_ZONE_TABLE: DecisionTable<OscillatorFacts, Verdict> = DecisionTable {
    rows: BADGE_ZONE_RULES,
    otherwise_name: "neutral",
    otherwise: Verdict::new(Polarity::Neutral, 2, "Neutral zone"),
};

const BADGE_ZONE_RULES: &[Rule<OscillatorFacts, Verdict>] = &[
    Rule {
        name: "overbought",
        when: |f| f.value > 70.0,
        then: Verdict::new(Polarity::Bearish, 3, "Overbought"),
    },
    Rule {
        name: "oversold",
        when: |f| f.value < 30.0,
        then: Verdict::new(Polarity::Bullish, 3, "Oversold"),
    },
    Rule {
        name: "bullish_zone",
        when: |f| (50.0..=70.0).contains(&f.value),
        then: Verdict::new(Polarity::Bullish, 2, "Bullish zone"),
    },
];

pub fn zone_table(precision: Precision) -> &'static DecisionTable<OscillatorFacts, Verdict> {
    match precision {
        Precision::Detailed => &DETAILED_ZONE_TABLE,
        Precision::Badge => &BADGE_ZONE_TABLE,
    }
}

pub fn classify_zone(facts: &OscillatorFacts, precision: Precision) -> (&'static str, Verdict) {
    let (name, verdict) = zone_table(precision).decide(facts);
    (name, *verdict)
}

/// Classify the bounded oscillator by zone and short-term direction.
pub fn analyze_oscillator_zone(
    series: &IndicatorSeries,
    precision: Precision,
) -> Result<TechnicalSignal, AnalysisError> {
    let fields = [("oscillator", series.oscillator.as_slice())];
    require_periods(OSCILLATOR_INDICATOR, &fields, MIN_CROSSOVER_PERIODS)?;

    let facts = OscillatorFacts::new(
        lookback(&series.oscillator, 0).unwrap_or_default(),
        lookback(&series.oscillator, 1).unwrap_or_default(),
    );

    let (rule, verdict) = classify_zone(&facts, precision);
    debug!(
        rule,
        ?precision,
        value = facts.value,
        delta = facts.delta,
        "oscillator zone classified"
    );

    let detail = format!("RSI {:.1}, change {:+.1}", facts.value, facts.delta);
    Ok(verdict.to_signal(OSCILLATOR_INDICATOR, &detail))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OscillatorAnalyzer {
    precision: Precision,
}

impl OscillatorAnalyzer {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }
}

impl SignalAnalyzer for OscillatorAnalyzer {
    fn name(&self) -> &'static str {
        OSCILLATOR_INDICATOR
    }

    fn min_periods(&self) -> usize {
        MIN_CROSSOVER_PERIODS
    }

    fn analyze(&self, series: &IndicatorSeries) -> Result<TechnicalSignal, AnalysisError> {
        analyze_oscillator_zone(series, self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detailed(value: f64, previous: f64) -> (&'static str, Verdict) {
        classify_zone(&OscillatorFacts::new(value, previous), Precision::Detailed)
    }

    fn badge(value: f64) -> &'static str {
        classify_zone(&OscillatorFacts::new(value, value), Precision::Badge).0
    }

    fn series(values: Vec<f64>) -> IndicatorSeries {
        IndicatorSeries {
            oscillator: values,
            ..Default::default()
        }
    }

    #[test]
    fn test_accumulation_surge_is_bullish_5() {
        let signal =
            analyze_oscillator_zone(&series(vec![42.0, 45.0]), Precision::Detailed).unwrap();
        assert_eq!(signal.polarity, Polarity::Bullish);
        assert_eq!(signal.strength, 5);
        assert!(signal.reason.contains("45.0"));
        assert!(signal.reason.contains("+3.0"));
    }

    #[test]
    fn test_every_detailed_row() {
        assert_eq!(detailed(55.0, 52.0).0, "accumulation_surge");
        assert_eq!(detailed(33.0, 32.0).0, "recovering");
        assert_eq!(detailed(60.0, 62.0).0, "bullish_zone");
        assert_eq!(detailed(68.0, 60.0).0, "strong_zone");
        assert_eq!(detailed(75.0, 70.0).0, "overbought");
        assert_eq!(detailed(85.0, 90.0).0, "extreme_overbought");
        assert_eq!(detailed(25.0, 28.0).0, "oversold_falling");
        assert_eq!(detailed(25.0, 22.0).0, "oversold_turning");
        assert_eq!(detailed(40.0, 41.0).0, "neutral");
    }

    #[test]
    fn test_boundary_30() {
        let (name, verdict) = detailed(30.0, 29.0);
        assert_eq!(name, "recovering");
        assert_eq!((verdict.polarity, verdict.strength), (Polarity::Bullish, 4));

        // 30 is not oversold; flat or falling lands in the neutral row
        let (name, verdict) = detailed(30.0, 31.0);
        assert_eq!(name, "neutral");
        assert_eq!((verdict.polarity, verdict.strength), (Polarity::Neutral, 2));
    }

    #[test]
    fn test_boundary_50() {
        assert_eq!(detailed(50.0, 47.0).0, "accumulation_surge");
        assert_eq!(detailed(50.0, 49.0).0, "recovering");
        // 50 is outside the exclusive lower bound of the bullish zone
        assert_eq!(detailed(50.0, 51.0).0, "neutral");
    }

    #[test]
    fn test_boundary_70() {
        let (name, verdict) = detailed(70.0, 72.0);
        assert_eq!(name, "strong_zone");
        assert_eq!((verdict.polarity, verdict.strength), (Polarity::Bullish, 3));
    }

    #[test]
    fn test_boundary_80() {
        let (name, verdict) = detailed(80.0, 75.0);
        assert_eq!(name, "overbought");
        assert_eq!((verdict.polarity, verdict.strength), (Polarity::Neutral, 2));
    }

    #[test]
    fn test_badge_table() {
        assert_eq!(badge(75.0), "overbought");
        assert_eq!(badge(70.0), "bullish_zone");
        assert_eq!(badge(50.0), "bullish_zone");
        assert_eq!(badge(45.0), "neutral");
        assert_eq!(badge(30.0), "neutral");
        assert_eq!(badge(20.0), "oversold");
    }

    #[test]
    fn test_precisions_disagree_on_oversold() {
        let facts = OscillatorFacts::new(20.0, 25.0);
        let (_, detail) = classify_zone(&facts, Precision::Detailed);
        let (_, coarse) = classify_zone(&facts, Precision::Badge);
        assert_eq!(detail.polarity, Polarity::Bearish);
        assert_eq!(coarse.polarity, Polarity::Bullish);
    }

    #[test]
    fn test_analyzer_uses_configured_precision() {
        let data = series(vec![78.0, 76.0]);
        let detail = OscillatorAnalyzer::new(Precision::Detailed).analyze(&data).unwrap();
        let coarse = OscillatorAnalyzer::new(Precision::Badge).analyze(&data).unwrap();
        assert_eq!(detail.polarity, Polarity::Neutral);
        assert_eq!(coarse.polarity, Polarity::Bearish);
    }

    #[test]
    fn test_empty_is_insufficient() {
        let err = analyze_oscillator_zone(&series(vec![]), Precision::Detailed).unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
