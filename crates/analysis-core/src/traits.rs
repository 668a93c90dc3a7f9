use crate::{AnalysisError, IndicatorSeries, TechnicalSignal};

/// A single-indicator classifier over an aligned [`IndicatorSeries`].
///
/// Implementations are pure: the same series always yields the same signal.
pub trait SignalAnalyzer: Send + Sync {
    /// Name reported in [`TechnicalSignal::indicator_name`].
    fn name(&self) -> &'static str;

    /// Fewest periods the analyzer needs to look back over.
    fn min_periods(&self) -> usize;

    fn analyze(&self, series: &IndicatorSeries) -> Result<TechnicalSignal, AnalysisError>;
}
