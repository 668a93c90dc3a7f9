use analysis_core::{
    DecisionTable, Polarity, Precision, RecommendationLevel, RecommendationResult, Rule,
    TechnicalSignal,
};
use tracing::debug;

/// Signals at or above this strength count as strong confirmations.
pub const STRONG_SIGNAL_STRENGTH: u8 = 4;

/// Weighted tallies over a set of indicator signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalTally {
    pub bull_weight: u32,
    pub bear_weight: u32,
    pub total_weight: u32,
    /// (bull - bear) / total, in [-1, 1]
    pub net_score: f64,
    /// Bullish signals with strength >= 4
    pub strong_signal_count: usize,
    pub all_bullish: bool,
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

impl SignalTally {
    pub fn from_signals(signals: &[TechnicalSignal]) -> Self {
        let mut bull_weight = 0u32;
        let mut bear_weight = 0u32;
        let mut total_weight = 0u32;
        let (mut bullish, mut bearish, mut neutral) = (0, 0, 0);

        for signal in signals {
            let weight = u32::from(signal.strength);
            total_weight += weight;
            match signal.polarity {
                Polarity::Bullish => {
                    bull_weight += weight;
                    bullish += 1;
                }
                Polarity::Bearish => {
                    bear_weight += weight;
                    bearish += 1;
                }
                Polarity::Neutral => neutral += 1,
            }
        }

        let net_score = if total_weight > 0 {
            (bull_weight as f64 - bear_weight as f64) / total_weight as f64
        } else {
            0.0
        };

        let strong_signal_count = signals
            .iter()
            .filter(|s| s.is_bullish() && s.strength >= STRONG_SIGNAL_STRENGTH)
            .count();

        Self {
            bull_weight,
            bear_weight,
            total_weight,
            net_score,
            strong_signal_count,
            all_bullish: !signals.is_empty() && bullish == signals.len(),
            bullish,
            bearish,
            neutral,
        }
    }

    /// |net score| scaled to 0-100
    pub fn confidence(&self) -> f64 {
        (self.net_score.abs() * 100.0).clamp(0.0, 100.0)
    }
}

/// Outcome row of a recommendation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub level: RecommendationLevel,
    pub summary: &'static str,
}

const fn call(level: RecommendationLevel, summary: &'static str) -> Call {
    Call { level, summary }
}

/// Thresholds behind the detail panel.
pub static DETAILED_RECOMMENDATION_TABLE: DecisionTable<SignalTally, Call> = DecisionTable {
    rows: DETAILED_RECOMMENDATION_RULES,
    otherwise_name: "strong_sell",
    otherwise: call(RecommendationLevel::StrongSell, "Strong bearish indicator consensus"),
};

const DETAILED_RECOMMENDATION_RULES: &[Rule<SignalTally, Call>] = &[
    Rule {
        name: "exceptional",
        when: |t| t.all_bullish && t.strong_signal_count >= 2,
        then: call(
            RecommendationLevel::StrongBuy,
            "Exceptional setup: every indicator bullish with multiple strong confirmations",
        ),
    },
    Rule {
        name: "overwhelming",
        when: |t| t.net_score >= 0.8,
        then: call(RecommendationLevel::StrongBuy, "Overwhelmingly bullish indicator consensus"),
    },
    Rule {
        name: "strong_confirmed",
        when: |t| t.net_score >= 0.6 && t.strong_signal_count >= 1,
        then: call(
            RecommendationLevel::StrongBuy,
            "Strong bullish consensus backed by a high-conviction signal",
        ),
    },
    Rule {
        name: "buy",
        when: |t| t.net_score >= 0.4,
        then: call(RecommendationLevel::Buy, "Bullish indicators outweigh bearish ones"),
    },
    Rule {
        name: "lean_buy",
        when: |t| t.net_score >= 0.15,
        then: call(RecommendationLevel::Buy, "Modestly bullish, confirmation still building"),
    },
    Rule {
        name: "neutral",
        when: |t| t.net_score >= -0.15,
        then: call(RecommendationLevel::Neutral, "Indicators balanced, no clear direction"),
    },
    Rule {
        name: "sell",
        when: |t| t.net_score >= -0.5,
        then: call(RecommendationLevel::Sell, "Bearish indicators outweigh bullish ones"),
    },
];

/// Coarser thresholds behind the summary badge.
pub static BADGE_RECOMMENDATION_TABLE: DecisionTable<SignalTally, Call> = DecisionTable {
    rows: BADGE_RECOMMENDATION_RULES,
    otherwise_name: "strong_sell",
    otherwise: call(RecommendationLevel::StrongSell, "Strongly bearish"),
};

const BADGE_RECOMMENDATION_RULES: &[Rule<SignalTally, Call>] = &[
    Rule {
        name: "all_bullish",
        when: |t| t.all_bullish,
        then: call(RecommendationLevel::StrongBuy, "All indicators bullish"),
    },
    Rule {
        name: "strong_buy",
        when: |t| t.net_score >= 0.6,
        then: call(RecommendationLevel::StrongBuy, "Strongly bullish"),
    },
    Rule {
        name: "buy",
        when: |t| t.net_score >= 0.2,
        then: call(RecommendationLevel::Buy, "Bullish"),
    },
    Rule {
        name: "neutral",
        when: |t| t.net_score >= -0.2,
        then: call(RecommendationLevel::Neutral, "Mixed"),
    },
    Rule {
        name: "sell",
        when: |t| t.net_score >= -0.6,
        then: call(RecommendationLevel::Sell, "Bearish"),
    },
];

pub fn recommendation_table(precision: Precision) -> &'static DecisionTable<SignalTally, Call> {
    match precision {
        Precision::Detailed => &DETAILED_RECOMMENDATION_TABLE,
        Precision::Badge => &BADGE_RECOMMENDATION_TABLE,
    }
}

/// Combine indicator signals into one recommendation using the detailed thresholds.
pub fn aggregate_recommendation(signals: &[TechnicalSignal]) -> RecommendationResult {
    aggregate_recommendation_with(signals, Precision::Detailed)
}

/// Combine indicator signals into one recommendation.
///
/// An empty signal set yields [`RecommendationResult::insufficient_data`].
pub fn aggregate_recommendation_with(
    signals: &[TechnicalSignal],
    precision: Precision,
) -> RecommendationResult {
    if signals.is_empty() {
        return RecommendationResult::insufficient_data();
    }

    let tally = SignalTally::from_signals(signals);
    let (rule, call) = recommendation_table(precision).decide(&tally);

    debug!(
        rule,
        ?precision,
        net_score = tally.net_score,
        strong = tally.strong_signal_count,
        level = call.level.to_label(),
        "recommendation aggregated"
    );

    let summary = format!(
        "{} ({} bullish, {} bearish, {} neutral)",
        call.summary, tally.bullish, tally.bearish, tally.neutral
    );

    RecommendationResult {
        overall: call.level,
        confidence: tally.confidence(),
        signals: signals.to_vec(),
        summary,
    }
}
