use analysis_core::{first_match, FundamentalsSnapshot, Rule, ScoringConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Score every snapshot starts from before adjustments
pub const BASE_SCORE: i32 = 50;

/// Snapshot with every absent ratio replaced by the configured default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratios {
    pub roe: f64,
    pub net_margin: f64,
    pub gross_margin: f64,
    pub revenue_growth: f64,
    pub revenue_growth_3y: f64,
    pub eps_growth: f64,
    pub pe: f64,
    pub peg: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub interest_coverage: f64,
}

impl Ratios {
    pub fn resolve(snapshot: &FundamentalsSnapshot, missing: f64) -> Self {
        let or = |value: Option<f64>| value.unwrap_or(missing);
        Self {
            roe: or(snapshot.return_on_equity),
            net_margin: or(snapshot.net_margin),
            gross_margin: or(snapshot.gross_margin),
            revenue_growth: or(snapshot.revenue_growth_ttm),
            revenue_growth_3y: or(snapshot.revenue_growth_3y),
            eps_growth: or(snapshot.eps_growth_ttm),
            pe: or(snapshot.pe_ratio),
            peg: or(snapshot.peg_ratio),
            current_ratio: or(snapshot.current_ratio),
            debt_to_equity: or(snapshot.debt_to_equity),
            interest_coverage: or(snapshot.interest_coverage),
        }
    }
}

#[rustfmt::skip]
const ROE_RULES: &[Rule<Ratios, i32>] = &[
    Rule { name: "roe_excellent", when: |r| r.roe >= 20.0, then: 8 },
    Rule { name: "roe_strong", when: |r| r.roe >= 15.0, then: 6 },
    Rule { name: "roe_decent", when: |r| r.roe >= 10.0, then: 3 },
    Rule { name: "roe_weak", when: |r| r.roe < 5.0, then: -5 },
];

#[rustfmt::skip]
const NET_MARGIN_RULES: &[Rule<Ratios, i32>] = &[
    Rule { name: "net_margin_high", when: |r| r.net_margin > 15.0, then: 6 },
    Rule { name: "net_margin_healthy", when: |r| r.net_margin > 5.0, then: 3 },
    Rule { name: "net_margin_thin", when: |r| r.net_margin <= 5.0, then: -4 },
];

#[rustfmt::skip]
const GROSS_MARGIN_RULES: &[Rule<Ratios, i32>] = &[
    Rule { name: "gross_margin_high", when: |r| r.gross_margin > 40.0, then: 3 },
    Rule { name: "gross_margin_low", when: |r| r.gross_margin < 20.0, then: -3 },
];

#[rustfmt::skip]
const GROWTH_RULES: &[Rule<Ratios, i32>] = &[
    Rule {
        name: "growth_revenue_and_eps",
        when: |r| r.revenue_growth > 10.0 && r.eps_growth > 10.0,
        then: 8,
    },
    Rule { name: "growth_revenue", when: |r| r.revenue_growth > 5.0, then: 4 },
    Rule { name: "growth_shrinking", when: |r| r.revenue_growth < 0.0, then: -6 },
];

#[rustfmt::skip]
const GROWTH_3Y_RULES: &[Rule<Ratios, i32>] = &[
    Rule { name: "growth_3y_positive", when: |r| r.revenue_growth_3y > 5.0, then: 4 },
    Rule { name: "growth_3y_negative", when: |r| r.revenue_growth_3y < 0.0, then: -4 },
];

#[rustfmt::skip]
const PE_RULES: &[Rule<Ratios, i32>] = &[
    Rule { name: "pe_cheap", when: |r| r.pe < 15.0, then: 4 },
    Rule { name: "pe_expensive", when: |r| r.pe > 30.0, then: -4 },
];

#[rustfmt::skip]
const PEG_RULES: &[Rule<Ratios, i32>] = &[
    Rule { name: "peg_attractive", when: |r| r.peg < 1.0, then: 4 },
    Rule { name: "peg_expensive", when: |r| r.peg > 2.0, then: -4 },
];

#[rustfmt::skip]
const BALANCE_SHEET_RULES: &[Rule<Ratios, i32>] = &[
    Rule {
        name: "balance_sheet_fortress",
        when: |r| r.current_ratio >= 1.5 && r.debt_to_equity <= 0.5 && r.interest_coverage >= 5.0,
        then: 8,
    },
    Rule {
        name: "balance_sheet_sound",
        when: |r| r.current_ratio >= 1.0 && r.debt_to_equity <= 1.0,
        then: 4,
    },
    Rule { name: "balance_sheet_stretched", when: analysis_core::always, then: -6 },
];

/// Independent factor groups. Within a group the first matching row applies;
/// every group contributes.
pub const FACTOR_GROUPS: &[(&str, &[Rule<Ratios, i32>])] = &[
    ("roe", ROE_RULES),
    ("net_margin", NET_MARGIN_RULES),
    ("gross_margin", GROSS_MARGIN_RULES),
    ("growth", GROWTH_RULES),
    ("growth_3y", GROWTH_3Y_RULES),
    ("pe", PE_RULES),
    ("peg", PEG_RULES),
    ("balance_sheet", BALANCE_SHEET_RULES),
];

/// One fired rule and the points it contributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    pub factor: String,
    pub rule: String,
    pub points: i32,
}

/// Final score plus the adjustments that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundamentalsBreakdown {
    /// 0-100
    pub score: u8,
    /// Unclamped sum of base and adjustments
    pub raw_score: i32,
    pub adjustments: Vec<ScoreAdjustment>,
}

/// Ratio-based fundamentals scorer.
#[derive(Debug, Clone, Default)]
pub struct FundamentalsScorer {
    config: ScoringConfig,
}

impl FundamentalsScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, snapshot: &FundamentalsSnapshot) -> u8 {
        self.breakdown(snapshot).score
    }

    pub fn breakdown(&self, snapshot: &FundamentalsSnapshot) -> FundamentalsBreakdown {
        let ratios = Ratios::resolve(snapshot, self.config.missing_ratio_default);

        let adjustments: Vec<ScoreAdjustment> = FACTOR_GROUPS
            .iter()
            .filter_map(|(factor, rules)| {
                first_match(*rules, &ratios).map(|rule| ScoreAdjustment {
                    factor: factor.to_string(),
                    rule: rule.name.to_string(),
                    points: rule.then,
                })
            })
            .collect();

        let raw_score = BASE_SCORE + adjustments.iter().map(|a| a.points).sum::<i32>();
        let score = raw_score.clamp(0, 100) as u8;

        debug!(raw_score, score, fired = adjustments.len(), "fundamentals scored");

        FundamentalsBreakdown {
            score,
            raw_score,
            adjustments,
        }
    }
}

/// Score a snapshot with default configuration (absent ratios count as 0).
pub fn score_fundamentals(snapshot: &FundamentalsSnapshot) -> u8 {
    FundamentalsScorer::default().score(snapshot)
}
