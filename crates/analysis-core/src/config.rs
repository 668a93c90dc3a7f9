use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::AnalysisError;

/// Which variant of the oscillator / recommendation tables to apply.
///
/// `Detailed` is the canonical table set used for the detail panel. `Badge` is
/// the coarser heuristic behind the compact summary badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Detailed,
    Badge,
}

impl FromStr for Precision {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(Precision::Detailed),
            "badge" => Ok(Precision::Badge),
            other => Err(AnalysisError::Config(format!(
                "unknown precision '{}', expected 'detailed' or 'badge'",
                other
            ))),
        }
    }
}

/// Upper bound for `max_staleness_days` (about a century)
pub const MAX_STALENESS_DAYS_LIMIT: i64 = 36_500;

/// Defaults substituted for missing inputs, plus table selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Value used for any absent fundamentals ratio before it is compared
    pub missing_ratio_default: f64,

    /// Score (0-100) assumed for a missing upstream domain score
    pub neutral_score: f64,

    /// Score (0-100) assumed for a missing retail or professional sentiment side
    pub sentiment_default: f64,

    pub precision: Precision,

    /// Series whose latest period is older than this are flagged stale
    pub max_staleness_days: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            missing_ratio_default: 0.0,
            neutral_score: 50.0,
            sentiment_default: 50.0,
            precision: Precision::Detailed,
            max_staleness_days: 5,
        }
    }
}

impl ScoringConfig {
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Load from `SCORECARD_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys keep their default.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, AnalysisError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            missing_ratio_default: parse_or(
                read("SCORECARD_MISSING_RATIO_DEFAULT"),
                "SCORECARD_MISSING_RATIO_DEFAULT",
                defaults.missing_ratio_default,
            )?,
            neutral_score: parse_or(
                read("SCORECARD_NEUTRAL_SCORE"),
                "SCORECARD_NEUTRAL_SCORE",
                defaults.neutral_score,
            )?,
            sentiment_default: parse_or(
                read("SCORECARD_SENTIMENT_DEFAULT"),
                "SCORECARD_SENTIMENT_DEFAULT",
                defaults.sentiment_default,
            )?,
            precision: match read("SCORECARD_PRECISION") {
                Some(raw) => raw.parse()?,
                None => defaults.precision,
            },
            max_staleness_days: parse_or(
                read("SCORECARD_MAX_STALENESS_DAYS"),
                "SCORECARD_MAX_STALENESS_DAYS",
                defaults.max_staleness_days,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scoring pipeline cannot work with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(0..=MAX_STALENESS_DAYS_LIMIT).contains(&self.max_staleness_days) {
            return Err(AnalysisError::Config(format!(
                "max_staleness_days must be between 0 and {}, got {}",
                MAX_STALENESS_DAYS_LIMIT, self.max_staleness_days
            )));
        }
        for (name, value) in [
            ("missing_ratio_default", self.missing_ratio_default),
            ("neutral_score", self.neutral_score),
            ("sentiment_default", self.sentiment_default),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::Config(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AnalysisError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AnalysisError::Config(format!("{} has invalid value '{}'", key, value))),
        None => Ok(default),
    }
}
