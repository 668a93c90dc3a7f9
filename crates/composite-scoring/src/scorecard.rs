use analysis_core::{
    AnalysisError, FundamentalsSnapshot, IndicatorSeries, RecommendationResult, ScoringConfig,
};
use fundamental_analysis::{FundamentalsBreakdown, FundamentalsScorer};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use technical_analysis::{IndicatorPeriods, TechnicalAnalysisEngine};
use tracing::{info, warn};

use crate::composite::{sentiment_score, CompositeBreakdown, CompositeInputs, CompositeSynthesizer};

/// Everything known about one symbol. Each domain is optional; missing domains
/// score neutral in the composite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorecardRequest {
    pub symbol: String,
    /// Precomputed indicator arrays. Takes priority over `closes`.
    pub series: Option<IndicatorSeries>,
    /// Daily closes, oldest first
    pub closes: Option<Vec<f64>>,
    /// First close of the calendar year, used to derive YTD change from `closes`
    pub year_open: Option<f64>,
    pub fundamentals: Option<FundamentalsSnapshot>,
    /// Year-to-date change in percent. Overrides the derived value.
    pub ytd_pct: Option<f64>,
    pub retail_sentiment: Option<f64>,
    pub professional_sentiment: Option<f64>,
}

impl ScorecardRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Explicit YTD percent, else the change from `year_open` to the last close.
    pub fn resolved_ytd_pct(&self) -> Option<f64> {
        if let Some(pct) = self.ytd_pct.filter(|p| p.is_finite()) {
            return Some(pct);
        }
        let open = self.year_open.filter(|o| o.is_finite() && *o > 0.0)?;
        let last = self.closes.as_ref()?.last().copied().filter(|c| c.is_finite())?;
        Some((last - open) / open * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub symbol: String,
    /// `None` when neither series nor closes were supplied
    pub recommendation: Option<RecommendationResult>,
    pub fundamentals: Option<FundamentalsBreakdown>,
    pub ytd_pct: Option<f64>,
    /// Mean of both sentiment sides, each defaulting to `sentiment_default`
    pub sentiment_score: f64,
    pub composite: CompositeBreakdown,
}

/// End-to-end pipeline: technical engine, fundamentals scorer and composite
/// synthesizer sharing one configuration.
pub struct ScorecardBuilder {
    engine: TechnicalAnalysisEngine,
    fundamentals: FundamentalsScorer,
    synthesizer: CompositeSynthesizer,
    periods: IndicatorPeriods,
    config: ScoringConfig,
}

impl ScorecardBuilder {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            engine: TechnicalAnalysisEngine::with_config(config.clone()),
            fundamentals: FundamentalsScorer::new(config.clone()),
            synthesizer: CompositeSynthesizer::new(config.clone()),
            periods: IndicatorPeriods::default(),
            config,
        }
    }

    pub fn with_periods(mut self, periods: IndicatorPeriods) -> Self {
        self.periods = periods;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn technical(
        &self,
        request: &ScorecardRequest,
    ) -> Result<Option<RecommendationResult>, AnalysisError> {
        match (&request.series, &request.closes) {
            (Some(series), _) => self.engine.recommend(series).map(Some),
            (None, Some(closes)) => self
                .engine
                .recommend_from_closes(closes, &self.periods)
                .map(Some),
            (None, None) => Ok(None),
        }
    }

    pub fn build(&self, request: &ScorecardRequest) -> Result<Scorecard, AnalysisError> {
        let recommendation = self.technical(request)?;
        let fundamentals = request
            .fundamentals
            .as_ref()
            .map(|snapshot| self.fundamentals.breakdown(snapshot));
        let ytd_pct = request.resolved_ytd_pct();
        let sentiment = sentiment_score(
            request.retail_sentiment,
            request.professional_sentiment,
            &self.config,
        );

        // The sentinel carries a Neutral level with zero confidence; treat it as missing
        let technical = recommendation
            .as_ref()
            .filter(|r| !r.is_insufficient_data())
            .map(|r| r.overall);
        if recommendation.as_ref().is_some_and(|r| r.is_insufficient_data()) {
            warn!(symbol = %request.symbol, "technical domain has insufficient data");
        }

        let composite = self.synthesizer.breakdown(&CompositeInputs {
            ytd_pct,
            fundamentals_score: fundamentals.as_ref().map(|f| f64::from(f.score)),
            technical,
            sentiment_score: Some(sentiment),
        });

        info!(
            symbol = %request.symbol,
            score = composite.result.score,
            label = composite.result.label.to_label(),
            "scorecard built"
        );

        Ok(Scorecard {
            symbol: request.symbol.clone(),
            recommendation,
            fundamentals,
            ytd_pct,
            sentiment_score: sentiment,
            composite,
        })
    }

    /// Score many requests in parallel. Results keep input order; one failing
    /// request does not affect the others.
    pub fn build_batch(
        &self,
        requests: &[ScorecardRequest],
    ) -> Vec<Result<Scorecard, AnalysisError>> {
        requests
            .par_iter()
            .map(|request| self.build(request))
            .collect()
    }
}

impl Default for ScorecardBuilder {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
