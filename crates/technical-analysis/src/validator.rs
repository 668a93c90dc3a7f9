use analysis_core::{AnalysisError, IndicatorSeries, ScoringConfig};
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Periods needed for the five-period trend lookback
pub const MIN_TREND_PERIODS: usize = 6;
/// Periods needed to compare the latest value with the previous one
pub const MIN_CROSSOVER_PERIODS: usize = 2;

/// Outcome of a successful validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesReport {
    pub len: usize,
    /// Latest period is older than the configured staleness window
    pub stale: bool,
}

/// Check alignment, length and freshness of a full indicator series.
///
/// Absent or short series are `InsufficientData`; mismatched lengths and
/// non-finite values are `Validation` errors naming the offending series.
/// Staleness is only reported, never rejected.
pub fn validate_series(
    series: &IndicatorSeries,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> Result<SeriesReport, AnalysisError> {
    let fields = series.fields();

    if let Some((name, _)) = fields.iter().find(|(_, values)| values.is_empty()) {
        return Err(AnalysisError::InsufficientData(format!(
            "{} series is empty",
            name
        )));
    }

    let len = check_aligned(&fields)?;

    if len < MIN_TREND_PERIODS {
        return Err(AnalysisError::InsufficientData(format!(
            "Need at least {} periods, got {}",
            MIN_TREND_PERIODS, len
        )));
    }

    let stale = match series.as_of {
        Some(as_of) => {
            let window = Duration::try_days(config.max_staleness_days).ok_or_else(|| {
                AnalysisError::Config(format!(
                    "max_staleness_days {} is out of range",
                    config.max_staleness_days
                ))
            })?;
            now - as_of > window
        }
        None => false,
    };
    if stale {
        warn!(
            as_of = ?series.as_of,
            max_staleness_days = config.max_staleness_days,
            "indicator series is stale"
        );
    }

    Ok(SeriesReport { len, stale })
}

/// Shared length check for a subset of named series.
///
/// Returns the common length once every series has the same length and only
/// finite values.
pub fn check_aligned(fields: &[(&'static str, &[f64])]) -> Result<usize, AnalysisError> {
    let Some((_, first)) = fields.first() else {
        return Ok(0);
    };
    let len = first.len();

    for (name, values) in fields {
        if values.len() != len {
            return Err(AnalysisError::validation(
                *name,
                format!("length {} does not match expected {}", values.len(), len),
            ));
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::validation(
                *name,
                format!("non-finite value at index {}", idx),
            ));
        }
    }

    Ok(len)
}

/// Aligned length of `fields`, or `InsufficientData` when shorter than `min`.
pub(crate) fn require_periods(
    indicator: &str,
    fields: &[(&'static str, &[f64])],
    min: usize,
) -> Result<usize, AnalysisError> {
    let shortest = fields.iter().map(|(_, v)| v.len()).min().unwrap_or(0);
    if shortest < min {
        return Err(AnalysisError::InsufficientData(format!(
            "{} needs at least {} periods, got {}",
            indicator, min, shortest
        )));
    }
    check_aligned(fields)
}
