use analysis_core::{
    lookback, AnalysisError, DecisionTable, IndicatorSeries, Polarity, Rule, SignalAnalyzer,
    TechnicalSignal,
};
use tracing::debug;

use crate::validator::{require_periods, MIN_CROSSOVER_PERIODS};
use crate::verdict::Verdict;

pub const MOMENTUM_INDICATOR: &str = "MACD Momentum";

/// Latest and previous readings of the momentum line, its signal line and histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumReading {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    pub prev_line: f64,
    pub prev_signal: f64,
    pub prev_histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentumFacts {
    pub bullish_crossover: bool,
    pub bearish_crossover: bool,
    pub line_above_signal: bool,
    pub line_below_signal: bool,
    pub above_zero: bool,
    pub below_zero: bool,
    pub histogram_rising: bool,
    pub histogram_falling: bool,
}

impl From<&MomentumReading> for MomentumFacts {
    fn from(r: &MomentumReading) -> Self {
        Self {
            bullish_crossover: r.line > r.signal && r.prev_line <= r.prev_signal,
            bearish_crossover: r.line < r.signal && r.prev_line >= r.prev_signal,
            line_above_signal: r.line > r.signal,
            line_below_signal: r.line < r.signal,
            above_zero: r.line > 0.0,
            below_zero: r.line < 0.0,
            histogram_rising: r.histogram > r.prev_histogram,
            histogram_falling: r.histogram < r.prev_histogram,
        }
    }
}

pub static MOMENTUM_TABLE: DecisionTable<MomentumFacts, Verdict> = DecisionTable {
    rows: MOMENTUM_RULES,
    otherwise_name: "no_edge",
    otherwise: Verdict::new(Polarity::Neutral, 2, "No clear momentum edge"),
};

const MOMENTUM_RULES: &[Rule<MomentumFacts, Verdict>] = &[
    Rule {
        name: "bullish_cross_above_zero",
        when: |f| f.bullish_crossover && f.above_zero,
        then: Verdict::new(Polarity::Bullish, 5, "Bullish crossover above the zero line"),
    },
    Rule {
        name: "bullish_cross",
        when: |f| f.bullish_crossover,
        then: Verdict::new(Polarity::Bullish, 4, "Bullish crossover"),
    },
    Rule {
        name: "bullish_expanding",
        when: |f| f.line_above_signal && f.histogram_rising && f.above_zero,
        then: Verdict::new(
            Polarity::Bullish,
            3,
            "Above signal line with expanding histogram in positive territory",
        ),
    },
    Rule {
        name: "bearish_cross_below_zero",
        when: |f| f.bearish_crossover && f.below_zero,
        then: Verdict::new(Polarity::Bearish, 5, "Bearish crossover below the zero line"),
    },
    Rule {
        name: "bearish_cross",
        when: |f| f.bearish_crossover,
        then: Verdict::new(Polarity::Bearish, 4, "Bearish crossover"),
    },
    Rule {
        name: "bearish_expanding",
        when: |f| f.line_below_signal && f.histogram_falling && f.below_zero,
        then: Verdict::new(
            Polarity::Bearish,
            4,
            "Below signal line with deepening histogram in negative territory",
        ),
    },
    Rule {
        name: "below_signal",
        when: |f| f.line_below_signal && !f.histogram_rising,
        then: Verdict::new(Polarity::Bearish, 3, "Below signal line without recovery"),
    },
];

pub fn classify_momentum(reading: &MomentumReading) -> (&'static str, Verdict) {
    let facts = MomentumFacts::from(reading);
    let (name, verdict) = MOMENTUM_TABLE.decide(&facts);
    (name, *verdict)
}

/// Classify the momentum line against its signal line and histogram.
pub fn analyze_momentum(series: &IndicatorSeries) -> Result<TechnicalSignal, AnalysisError> {
    let fields = [
        ("momentum_line", series.momentum_line.as_slice()),
        ("momentum_signal", series.momentum_signal.as_slice()),
        ("momentum_histogram", series.momentum_histogram.as_slice()),
    ];
    require_periods(MOMENTUM_INDICATOR, &fields, MIN_CROSSOVER_PERIODS)?;

    let at = |values: &[f64], back: usize| lookback(values, back).unwrap_or_default();
    let reading = MomentumReading {
        line: at(&series.momentum_line, 0),
        signal: at(&series.momentum_signal, 0),
        histogram: at(&series.momentum_histogram, 0),
        prev_line: at(&series.momentum_line, 1),
        prev_signal: at(&series.momentum_signal, 1),
        prev_histogram: at(&series.momentum_histogram, 1),
    };

    let (rule, verdict) = classify_momentum(&reading);
    debug!(rule, ?reading, "momentum classified");

    let detail = format!(
        "line {:.3}, signal {:.3}, histogram {:.3}",
        reading.line, reading.signal, reading.histogram
    );
    Ok(verdict.to_signal(MOMENTUM_INDICATOR, &detail))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumAnalyzer;

impl SignalAnalyzer for MomentumAnalyzer {
    fn name(&self) -> &'static str {
        MOMENTUM_INDICATOR
    }

    fn min_periods(&self) -> usize {
        MIN_CROSSOVER_PERIODS
    }

    fn analyze(&self, series: &IndicatorSeries) -> Result<TechnicalSignal, AnalysisError> {
        analyze_momentum(series)
    }
}
