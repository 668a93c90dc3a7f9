use analysis_core::{
    all_matches, CompositeLabel, CompositeScore, DecisionTable, RecommendationLevel, Rule,
    ScoringConfig,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const YTD_WEIGHT: f64 = 0.25;
pub const FUNDAMENTALS_WEIGHT: f64 = 0.35;
pub const TECHNICAL_WEIGHT: f64 = 0.25;
pub const SENTIMENT_WEIGHT: f64 = 0.15;

/// Domain scores below this count as weak when deciding caps
pub const WEAK_DOMAIN_SCORE: f64 = 45.0;

#[rustfmt::skip]
pub static YTD_BUCKETS: DecisionTable<f64, f64> = DecisionTable {
    rows: &[
        Rule { name: "ytd_above_20", when: |p| *p > 20.0, then: 80.0 },
        Rule { name: "ytd_above_10", when: |p| *p > 10.0, then: 70.0 },
        Rule { name: "ytd_positive", when: |p| *p > 0.0, then: 60.0 },
        Rule { name: "ytd_above_minus_10", when: |p| *p > -10.0, then: 40.0 },
        Rule { name: "ytd_above_minus_20", when: |p| *p > -20.0, then: 30.0 },
    ],
    otherwise_name: "ytd_deep_loss",
    otherwise: 20.0,
};

/// Bucket a year-to-date percentage change into a 0-100 score.
pub fn ytd_score(ytd_pct: f64) -> f64 {
    *YTD_BUCKETS.decide(&ytd_pct).1
}

/// Fixed point value of a technical recommendation level.
pub fn technical_points(level: RecommendationLevel) -> f64 {
    match level {
        RecommendationLevel::StrongBuy => 85.0,
        RecommendationLevel::Buy => 70.0,
        RecommendationLevel::Neutral => 50.0,
        RecommendationLevel::Sell => 30.0,
        RecommendationLevel::StrongSell => 15.0,
    }
}

/// Average of retail and professional sentiment, each side defaulting to
/// `config.sentiment_default` when absent.
pub fn sentiment_score(
    retail: Option<f64>,
    professional: Option<f64>,
    config: &ScoringConfig,
) -> f64 {
    let side = |value: Option<f64>| {
        value
            .filter(|v| v.is_finite())
            .unwrap_or(config.sentiment_default)
    };
    (side(retail) + side(professional)) / 2.0
}

/// Inputs of the composite. Any `None` (or non-finite value) falls back to the
/// configured neutral score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeInputs {
    pub ytd_pct: Option<f64>,
    pub fundamentals_score: Option<f64>,
    pub technical: Option<RecommendationLevel>,
    pub sentiment_score: Option<f64>,
}

/// Resolved domain scores the caps are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeFacts {
    pub technical: Option<RecommendationLevel>,
    pub ytd_score: f64,
    pub fundamentals_score: f64,
    pub technical_score: f64,
}

/// Ceilings applied after weighting. Every matching cap applies; the lowest wins.
pub const CAP_RULES: &[Rule<CompositeFacts, f64>] = &[
    Rule {
        name: "technical_strong_sell",
        when: |f| f.technical == Some(RecommendationLevel::StrongSell),
        then: 25.0,
    },
    Rule {
        name: "technical_sell",
        when: |f| f.technical == Some(RecommendationLevel::Sell),
        then: 35.0,
    },
    Rule {
        name: "all_domains_weak",
        when: |f| {
            f.fundamentals_score < WEAK_DOMAIN_SCORE
                && f.ytd_score < WEAK_DOMAIN_SCORE
                && f.technical_score < WEAK_DOMAIN_SCORE
        },
        then: 20.0,
    },
    Rule {
        name: "strong_sell_weak_fundamentals_and_ytd",
        when: |f| {
            f.technical == Some(RecommendationLevel::StrongSell)
                && f.fundamentals_score < WEAK_DOMAIN_SCORE
                && f.ytd_score < WEAK_DOMAIN_SCORE
        },
        then: 15.0,
    },
];

/// Every intermediate value behind a composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBreakdown {
    pub ytd_score: f64,
    pub fundamentals_score: f64,
    pub technical_score: f64,
    pub sentiment_score: f64,
    /// Weighted sum before caps
    pub weighted: f64,
    /// After caps, before rounding
    pub capped: f64,
    pub caps_applied: Vec<String>,
    pub result: CompositeScore,
}

#[derive(Debug, Clone, Default)]
pub struct CompositeSynthesizer {
    config: ScoringConfig,
}

impl CompositeSynthesizer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(&self, inputs: &CompositeInputs) -> CompositeScore {
        self.breakdown(inputs).result
    }

    pub fn breakdown(&self, inputs: &CompositeInputs) -> CompositeBreakdown {
        let neutral = self.config.neutral_score;
        let known = |value: Option<f64>| value.filter(|v| v.is_finite());

        let ytd = known(inputs.ytd_pct).map(ytd_score).unwrap_or(neutral);
        let fundamentals = known(inputs.fundamentals_score).unwrap_or(neutral);
        let technical = inputs.technical.map(technical_points).unwrap_or(neutral);
        let sentiment = known(inputs.sentiment_score).unwrap_or(neutral);

        let weighted = YTD_WEIGHT * ytd
            + FUNDAMENTALS_WEIGHT * fundamentals
            + TECHNICAL_WEIGHT * technical
            + SENTIMENT_WEIGHT * sentiment;

        let facts = CompositeFacts {
            technical: inputs.technical,
            ytd_score: ytd,
            fundamentals_score: fundamentals,
            technical_score: technical,
        };

        let mut capped = weighted;
        let mut caps_applied = Vec::new();
        for cap in all_matches(CAP_RULES, &facts) {
            capped = capped.min(cap.then);
            caps_applied.push(cap.name.to_string());
        }

        let score = capped.round().clamp(0.0, 100.0) as u8;
        let result = CompositeScore {
            score,
            label: CompositeLabel::from_score(score),
        };

        debug!(
            ytd,
            fundamentals,
            technical,
            sentiment,
            weighted,
            score,
            label = result.label.to_label(),
            caps = ?caps_applied,
            "composite synthesized"
        );

        CompositeBreakdown {
            ytd_score: ytd,
            fundamentals_score: fundamentals,
            technical_score: technical,
            sentiment_score: sentiment,
            weighted,
            capped,
            caps_applied,
            result,
        }
    }
}

/// Blend YTD change, fundamentals score, technical level and sentiment into the
/// final score and label, using default configuration.
pub fn synthesize_composite(
    ytd_pct: f64,
    fundamentals_score: f64,
    technical: RecommendationLevel,
    sentiment_score: f64,
) -> CompositeScore {
    CompositeSynthesizer::default().synthesize(&CompositeInputs {
        ytd_pct: Some(ytd_pct),
        fundamentals_score: Some(fundamentals_score),
        technical: Some(technical),
        sentiment_score: Some(sentiment_score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ytd_buckets() {
        assert_eq!(ytd_score(35.0), 80.0);
        assert_eq!(ytd_score(20.0), 70.0);
        assert_eq!(ytd_score(10.0), 60.0);
        assert_eq!(ytd_score(0.5), 60.0);
        assert_eq!(ytd_score(0.0), 40.0);
        assert_eq!(ytd_score(-10.0), 30.0);
        assert_eq!(ytd_score(-15.0), 30.0);
        assert_eq!(ytd_score(-20.0), 20.0);
        assert_eq!(ytd_score(-60.0), 20.0);
    }

    #[test]
    fn test_technical_points() {
        assert_eq!(technical_points(RecommendationLevel::StrongBuy), 85.0);
        assert_eq!(technical_points(RecommendationLevel::Buy), 70.0);
        assert_eq!(technical_points(RecommendationLevel::Neutral), 50.0);
        assert_eq!(technical_points(RecommendationLevel::Sell), 30.0);
        assert_eq!(technical_points(RecommendationLevel::StrongSell), 15.0);
    }

    #[test]
    fn test_sentiment_average_defaults_each_side() {
        let config = ScoringConfig::default();
        assert_eq!(sentiment_score(Some(80.0), Some(60.0), &config), 70.0);
        assert_eq!(sentiment_score(Some(80.0), None, &config), 65.0);
        assert_eq!(sentiment_score(None, None, &config), 50.0);
        assert_eq!(sentiment_score(Some(f64::NAN), Some(70.0), &config), 60.0);
    }

    #[test]
    fn test_bearish_everything_clamps_to_15() {
        let breakdown = CompositeSynthesizer::default().breakdown(&CompositeInputs {
            ytd_pct: Some(-25.0),
            fundamentals_score: Some(20.0),
            technical: Some(RecommendationLevel::StrongSell),
            sentiment_score: Some(50.0),
        });

        assert_relative_eq!(breakdown.weighted, 23.25, epsilon = 1e-9);
        assert_eq!(breakdown.result.score, 15);
        assert_eq!(breakdown.result.label, CompositeLabel::Sell);
        assert_eq!(
            breakdown.caps_applied,
            vec![
                "technical_strong_sell",
                "all_domains_weak",
                "strong_sell_weak_fundamentals_and_ytd"
            ]
        );
    }

    #[test]
    fn test_free_function_matches_synthesizer() {
        let score = synthesize_composite(-25.0, 20.0, RecommendationLevel::StrongSell, 50.0);
        assert_eq!(score, CompositeScore { score: 15, label: CompositeLabel::Sell });
    }

    #[test]
    fn test_strong_everything() {
        // 0.25*80 + 0.35*90 + 0.25*85 + 0.15*80 = 84.75
        let score = synthesize_composite(30.0, 90.0, RecommendationLevel::StrongBuy, 80.0);
        assert_eq!(score.score, 85);
        assert_eq!(score.label, CompositeLabel::StrongBuy);
    }

    #[test]
    fn test_sell_caps_at_35() {
        // 0.25*80 + 0.35*90 + 0.25*30 + 0.15*80 = 71.0 -> capped at 35
        let score = synthesize_composite(30.0, 90.0, RecommendationLevel::Sell, 80.0);
        assert_eq!(score.score, 35);
        assert_eq!(score.label, CompositeLabel::WeakHold);
    }

    #[test]
    fn test_strong_sell_caps_at_25() {
        let score = synthesize_composite(30.0, 90.0, RecommendationLevel::StrongSell, 80.0);
        assert_eq!(score.score, 25);
        assert_eq!(score.label, CompositeLabel::Sell);
    }

    #[test]
    fn test_all_weak_caps_at_20_without_sell_signal() {
        // ytd 30, fundamentals 40, technical Neutral (50) -> technical not weak, no cap
        let score = synthesize_composite(-15.0, 40.0, RecommendationLevel::Neutral, 80.0);
        // 7.5 + 14 + 12.5 + 12 = 46
        assert_eq!(score.score, 46);

        // With Sell the technical score is 30, so every domain is weak
        let breakdown = CompositeSynthesizer::default().breakdown(&CompositeInputs {
            ytd_pct: Some(-15.0),
            fundamentals_score: Some(40.0),
            technical: Some(RecommendationLevel::Sell),
            sentiment_score: Some(80.0),
        });
        assert_eq!(breakdown.caps_applied, vec!["technical_sell", "all_domains_weak"]);
        assert_eq!(breakdown.result.score, 20);
    }

    #[test]
    fn test_missing_inputs_default_to_neutral() {
        let breakdown = CompositeSynthesizer::default().breakdown(&CompositeInputs::default());
        assert_eq!(breakdown.ytd_score, 50.0);
        assert_eq!(breakdown.technical_score, 50.0);
        assert_relative_eq!(breakdown.weighted, 50.0, epsilon = 1e-9);
        assert_eq!(breakdown.result.score, 50);
        assert_eq!(breakdown.result.label, CompositeLabel::Hold);
        assert!(breakdown.caps_applied.is_empty());
    }

    #[test]
    fn test_non_finite_inputs_treated_as_missing() {
        let score = CompositeSynthesizer::default().synthesize(&CompositeInputs {
            ytd_pct: Some(f64::NAN),
            fundamentals_score: Some(f64::INFINITY),
            technical: None,
            sentiment_score: None,
        });
        assert_eq!(score.score, 50);
    }

    #[test]
    fn test_neutral_score_is_configurable() {
        let synthesizer = CompositeSynthesizer::new(ScoringConfig {
            neutral_score: 60.0,
            ..Default::default()
        });
        assert_eq!(synthesizer.synthesize(&CompositeInputs::default()).score, 60);
    }
}
