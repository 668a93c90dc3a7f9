use analysis_core::{
    lookback, AnalysisError, DecisionTable, IndicatorSeries, Polarity, Rule, SignalAnalyzer,
    TechnicalSignal,
};
use tracing::debug;

use crate::validator::{require_periods, MIN_TREND_PERIODS};
use crate::verdict::Verdict;

pub const ALIGNMENT_INDICATOR: &str = "EMA Alignment";

/// Periods between the latest value and the trend reference value
pub const TREND_LOOKBACK: usize = 5;

/// Ordering and slope facts about the four moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentFacts {
    /// fast > mid1 > mid2 > slow
    pub perfect_order: bool,
    /// slow > mid2 > mid1 > fast
    pub reverse_order: bool,
    pub all_trending_up: bool,
    pub all_trending_down: bool,
    pub mostly_bearish: bool,
}

impl AlignmentFacts {
    /// `latest` and `earlier` are ordered fast, mid1, mid2, slow.
    pub fn from_values(latest: [f64; 4], earlier: [f64; 4]) -> Self {
        let [f, m1, m2, s] = latest;

        let rising = latest.iter().zip(earlier.iter()).all(|(now, then)| now > then);
        let falling = latest.iter().zip(earlier.iter()).all(|(now, then)| now < then);

        Self {
            perfect_order: f > m1 && m1 > m2 && m2 > s,
            reverse_order: s > m2 && m2 > m1 && m1 > f,
            all_trending_up: rising,
            all_trending_down: falling,
            mostly_bearish: (s > m2 && m2 > m1) || (m2 > m1 && m1 > f),
        }
    }
}

pub static ALIGNMENT_TABLE: DecisionTable<AlignmentFacts, Verdict> = DecisionTable {
    rows: ALIGNMENT_RULES,
    otherwise_name: "mixed",
    otherwise: Verdict::new(Polarity::Neutral, 2, "EMAs mixed, no clear alignment"),
};

const ALIGNMENT_RULES: &[Rule<AlignmentFacts, Verdict>] = &[
    Rule {
        name: "perfect_order_rising",
        when: |f| f.perfect_order && f.all_trending_up,
        then: Verdict::new(
            Polarity::Bullish,
            5,
            "Perfect bullish EMA alignment confirmed by rising trend",
        ),
    },
    Rule {
        name: "perfect_order",
        when: |f| f.perfect_order,
        then: Verdict::new(Polarity::Bullish, 4, "Perfect bullish EMA alignment, trend mixed"),
    },
    Rule {
        name: "reverse_order_falling",
        when: |f| f.reverse_order && f.all_trending_down,
        then: Verdict::new(
            Polarity::Bearish,
            5,
            "Full bearish EMA alignment confirmed by falling trend",
        ),
    },
    Rule {
        name: "reverse_order",
        when: |f| f.reverse_order,
        then: Verdict::new(Polarity::Bearish, 4, "Full bearish EMA alignment, trend mixed"),
    },
    Rule {
        name: "mostly_bearish",
        when: |f| f.mostly_bearish && !f.all_trending_up,
        then: Verdict::new(Polarity::Bearish, 3, "EMAs leaning bearish"),
    },
];

/// Classify the four-EMA stack into a single trend signal.
pub fn analyze_alignment(series: &IndicatorSeries) -> Result<TechnicalSignal, AnalysisError> {
    let fields = [
        ("ema_fast", series.ema_fast.as_slice()),
        ("ema_mid1", series.ema_mid1.as_slice()),
        ("ema_mid2", series.ema_mid2.as_slice()),
        ("ema_slow", series.ema_slow.as_slice()),
    ];
    require_periods(ALIGNMENT_INDICATOR, &fields, MIN_TREND_PERIODS)?;

    let latest = fields.map(|(_, values)| lookback(values, 0).unwrap_or_default());
    let earlier = fields.map(|(_, values)| lookback(values, TREND_LOOKBACK).unwrap_or_default());

    let facts = AlignmentFacts::from_values(latest, earlier);
    let (rule, verdict) = ALIGNMENT_TABLE.decide(&facts);

    debug!(rule, ?facts, "EMA alignment classified");

    let detail = format!(
        "fast {:.2}, mid {:.2}/{:.2}, slow {:.2}",
        latest[0], latest[1], latest[2], latest[3]
    );
    Ok(verdict.to_signal(ALIGNMENT_INDICATOR, &detail))
}

/// [`SignalAnalyzer`] wrapper around [`analyze_alignment`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentAnalyzer;

impl SignalAnalyzer for AlignmentAnalyzer {
    fn name(&self) -> &'static str {
        ALIGNMENT_INDICATOR
    }

    fn min_periods(&self) -> usize {
        MIN_TREND_PERIODS
    }

    fn analyze(&self, series: &IndicatorSeries) -> Result<TechnicalSignal, AnalysisError> {
        analyze_alignment(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Six periods per EMA, each series a straight line from `start` to `end`.
    fn ema_series(lines: [(f64, f64); 4]) -> IndicatorSeries {
        let line = |(start, end): (f64, f64)| -> Vec<f64> {
            (0..6).map(|i| start + (end - start) * i as f64 / 5.0).collect()
        };
        IndicatorSeries {
            ema_fast: line(lines[0]),
            ema_mid1: line(lines[1]),
            ema_mid2: line(lines[2]),
            ema_slow: line(lines[3]),
            ..Default::default()
        }
    }

    fn classify(latest: [f64; 4], earlier: [f64; 4]) -> &'static str {
        let facts = AlignmentFacts::from_values(latest, earlier);
        ALIGNMENT_TABLE.decide(&facts).0
    }

    #[test]
    fn test_perfect_order_all_rising_is_bullish_5() {
        let series = ema_series([(35.0, 40.0), (25.0, 30.0), (15.0, 20.0), (5.0, 10.0)]);
        let signal = analyze_alignment(&series).unwrap();
        assert_eq!(signal.polarity, Polarity::Bullish);
        assert_eq!(signal.strength, 5);
        assert_eq!(signal.indicator_name, "EMA Alignment");
    }

    #[test]
    fn test_perfect_order_mixed_trend() {
        assert_eq!(classify([40.0, 30.0, 20.0, 10.0], [41.0, 29.0, 19.0, 9.0]), "perfect_order");
    }

    #[test]
    fn test_reverse_order_rules() {
        assert_eq!(
            classify([10.0, 20.0, 30.0, 40.0], [11.0, 21.0, 31.0, 41.0]),
            "reverse_order_falling"
        );
        assert_eq!(classify([10.0, 20.0, 30.0, 40.0], [9.0, 21.0, 31.0, 41.0]), "reverse_order");
    }

    #[test]
    fn test_mostly_bearish() {
        // m2 > m1 > f but slow below mid2
        assert_eq!(classify([10.0, 20.0, 30.0, 25.0], [11.0, 20.0, 30.0, 25.0]), "mostly_bearish");
    }

    #[test]
    fn test_mostly_bearish_blocked_by_rising_trend() {
        assert_eq!(classify([10.0, 20.0, 30.0, 25.0], [9.0, 19.0, 29.0, 24.0]), "mixed");
    }

    #[test]
    fn test_mixed_is_neutral_2() {
        let series = ema_series([(20.0, 20.0), (30.0, 30.0), (10.0, 10.0), (40.0, 40.0)]);
        let signal = analyze_alignment(&series).unwrap();
        assert_eq!(signal.polarity, Polarity::Neutral);
        assert_eq!(signal.strength, 2);
    }

    #[test]
    fn test_flat_series_is_not_trending() {
        let facts = AlignmentFacts::from_values([4.0, 3.0, 2.0, 1.0], [4.0, 3.0, 2.0, 1.0]);
        assert!(!facts.all_trending_up);
        assert!(!facts.all_trending_down);
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let series = IndicatorSeries {
            ema_fast: vec![1.0; 5],
            ema_mid1: vec![1.0; 5],
            ema_mid2: vec![1.0; 5],
            ema_slow: vec![1.0; 5],
            ..Default::default()
        };
        assert!(analyze_alignment(&series).unwrap_err().is_insufficient_data());
    }
}
