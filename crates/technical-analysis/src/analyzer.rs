use analysis_core::{
    AnalysisError, IndicatorSeries, RecommendationResult, ScoringConfig, SignalAnalyzer,
    TechnicalSignal,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::aggregator::aggregate_recommendation_with;
use crate::alignment::AlignmentAnalyzer;
use crate::indicators::{series_from_closes, IndicatorPeriods};
use crate::momentum::MomentumAnalyzer;
use crate::oscillator::OscillatorAnalyzer;
use crate::validator::validate_series;

/// Runs the alignment, momentum and oscillator analyzers over one series and
/// folds their signals into a recommendation.
pub struct TechnicalAnalysisEngine {
    analyzers: Vec<Box<dyn SignalAnalyzer>>,
    config: ScoringConfig,
}

impl TechnicalAnalysisEngine {
    pub fn new() -> Self {
        Self::with_config(ScoringConfig::default())
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        let analyzers: Vec<Box<dyn SignalAnalyzer>> = vec![
            Box::new(AlignmentAnalyzer),
            Box::new(MomentumAnalyzer),
            Box::new(OscillatorAnalyzer::new(config.precision)),
        ];
        Self { analyzers, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Signals from every analyzer, in analyzer order.
    pub fn collect_signals(
        &self,
        series: &IndicatorSeries,
    ) -> Result<Vec<TechnicalSignal>, AnalysisError> {
        self.analyzers
            .iter()
            .map(|analyzer| {
                let signal = analyzer.analyze(series)?;
                debug!(
                    analyzer = analyzer.name(),
                    polarity = signal.polarity.to_label(),
                    strength = signal.strength,
                    "signal produced"
                );
                Ok(signal)
            })
            .collect()
    }

    /// Recommendation for `series`, judged as of now.
    pub fn recommend(
        &self,
        series: &IndicatorSeries,
    ) -> Result<RecommendationResult, AnalysisError> {
        self.recommend_at(series, Utc::now())
    }

    /// Recommendation for `series`, with freshness judged against `now`.
    ///
    /// Absent or short data yields the insufficient-data sentinel; misaligned
    /// series are returned as a `Validation` error.
    pub fn recommend_at(
        &self,
        series: &IndicatorSeries,
        now: DateTime<Utc>,
    ) -> Result<RecommendationResult, AnalysisError> {
        let report = match validate_series(series, &self.config, now) {
            Ok(report) => report,
            Err(AnalysisError::InsufficientData(msg)) => {
                warn!("Technical analysis skipped: {}", msg);
                return Ok(RecommendationResult::insufficient_data());
            }
            Err(e) => return Err(e),
        };
        debug!(periods = report.len, stale = report.stale, "series validated");

        if let Some(analyzer) = self.analyzers.iter().find(|a| report.len < a.min_periods()) {
            warn!(
                analyzer = analyzer.name(),
                needed = analyzer.min_periods(),
                periods = report.len,
                "Technical analysis skipped: series shorter than analyzer lookback"
            );
            return Ok(RecommendationResult::insufficient_data());
        }

        let signals = match self.collect_signals(series) {
            Ok(signals) => signals,
            Err(AnalysisError::InsufficientData(msg)) => {
                warn!("Technical analysis skipped: {}", msg);
                return Ok(RecommendationResult::insufficient_data());
            }
            Err(e) => return Err(e),
        };

        Ok(aggregate_recommendation_with(&signals, self.config.precision))
    }

    /// Derive the series from daily closes, then recommend.
    pub fn recommend_from_closes(
        &self,
        closes: &[f64],
        periods: &IndicatorPeriods,
    ) -> Result<RecommendationResult, AnalysisError> {
        match series_from_closes(closes, periods) {
            Ok(series) => self.recommend(&series),
            Err(AnalysisError::InsufficientData(msg)) => {
                warn!("Technical analysis skipped: {}", msg);
                Ok(RecommendationResult::insufficient_data())
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for TechnicalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
