use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction a single indicator leans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Bullish,
    Bearish,
    Neutral,
}

impl Polarity {
    pub fn to_label(&self) -> &'static str {
        match self {
            Polarity::Bullish => "Bullish",
            Polarity::Bearish => "Bearish",
            Polarity::Neutral => "Neutral",
        }
    }
}

pub const MIN_STRENGTH: u8 = 1;
pub const MAX_STRENGTH: u8 = 5;

/// Verdict of one indicator analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSignal {
    pub indicator_name: String,
    pub polarity: Polarity,
    /// 1 (weak) to 5 (strong)
    pub strength: u8,
    pub reason: String,
}

impl TechnicalSignal {
    /// Strength is clamped into `1..=5`.
    pub fn new(
        indicator_name: impl Into<String>,
        polarity: Polarity,
        strength: u8,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            indicator_name: indicator_name.into(),
            polarity,
            strength: strength.clamp(MIN_STRENGTH, MAX_STRENGTH),
            reason: reason.into(),
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.polarity == Polarity::Bullish
    }
}

/// Overall technical recommendation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationLevel {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl RecommendationLevel {
    /// Human-readable label for the level
    pub fn to_label(&self) -> &'static str {
        match self {
            RecommendationLevel::StrongBuy => "Strong Buy",
            RecommendationLevel::Buy => "Buy",
            RecommendationLevel::Neutral => "Neutral",
            RecommendationLevel::Sell => "Sell",
            RecommendationLevel::StrongSell => "Strong Sell",
        }
    }
}

pub const INSUFFICIENT_DATA_SUMMARY: &str = "insufficient data";

/// Aggregated technical verdict across all indicator signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub overall: RecommendationLevel,
    /// 0.0 to 100.0
    pub confidence: f64,
    pub signals: Vec<TechnicalSignal>,
    pub summary: String,
}

impl RecommendationResult {
    /// Neutral, zero-confidence result returned when there is nothing to analyze.
    pub fn insufficient_data() -> Self {
        Self {
            overall: RecommendationLevel::Neutral,
            confidence: 0.0,
            signals: Vec::new(),
            summary: INSUFFICIENT_DATA_SUMMARY.to_string(),
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        self.signals.is_empty() && self.summary == INSUFFICIENT_DATA_SUMMARY
    }
}

/// Point-in-time fundamentals ratios. Every field is optional; percentages are
/// expressed as whole numbers (15.0 = 15%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsSnapshot {
    pub return_on_equity: Option<f64>,
    pub net_margin: Option<f64>,
    pub gross_margin: Option<f64>,
    pub revenue_growth_ttm: Option<f64>,
    pub revenue_growth_3y: Option<f64>,
    pub eps_growth_ttm: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub current_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
}

/// Final user-facing label of the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeLabel {
    StrongBuy,
    Buy,
    Hold,
    WeakHold,
    Sell,
}

impl CompositeLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 75 => CompositeLabel::StrongBuy,
            s if s >= 60 => CompositeLabel::Buy,
            s if s >= 45 => CompositeLabel::Hold,
            s if s >= 30 => CompositeLabel::WeakHold,
            _ => CompositeLabel::Sell,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            CompositeLabel::StrongBuy => "Strong Buy",
            CompositeLabel::Buy => "Buy",
            CompositeLabel::Hold => "Hold",
            CompositeLabel::WeakHold => "Weak Hold",
            CompositeLabel::Sell => "Sell",
        }
    }
}

/// Blended cross-domain score (0-100) and its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: u8,
    pub label: CompositeLabel,
}

/// Aligned indicator arrays, oldest period first. Every series must share the
/// same length; the latest value sits at index `len - 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub ema_fast: Vec<f64>,
    pub ema_mid1: Vec<f64>,
    pub ema_mid2: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub momentum_line: Vec<f64>,
    pub momentum_signal: Vec<f64>,
    pub momentum_histogram: Vec<f64>,
    /// Bounded 0-100 oscillator
    pub oscillator: Vec<f64>,
    /// Timestamp of the latest period, if the data layer supplied one
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl IndicatorSeries {
    /// Length of the shortest series (equal to `len` once validated).
    pub fn len(&self) -> usize {
        self.fields()
            .iter()
            .map(|(_, values)| values.len())
            .min()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Named view of every series, in declaration order.
    pub fn fields(&self) -> [(&'static str, &[f64]); 8] {
        [
            ("ema_fast", self.ema_fast.as_slice()),
            ("ema_mid1", self.ema_mid1.as_slice()),
            ("ema_mid2", self.ema_mid2.as_slice()),
            ("ema_slow", self.ema_slow.as_slice()),
            ("momentum_line", self.momentum_line.as_slice()),
            ("momentum_signal", self.momentum_signal.as_slice()),
            ("momentum_histogram", self.momentum_histogram.as_slice()),
            ("oscillator", self.oscillator.as_slice()),
        ]
    }
}

/// Value `back` periods before the latest one.
pub fn lookback(values: &[f64], back: usize) -> Option<f64> {
    values
        .len()
        .checked_sub(back + 1)
        .and_then(|idx| values.get(idx).copied())
}
