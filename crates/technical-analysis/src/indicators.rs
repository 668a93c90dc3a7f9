use analysis_core::{AnalysisError, IndicatorSeries};
use serde::{Deserialize, Serialize};

/// Exponential Moving Average, seeded with the SMA of the first `period` values.
///
/// Output is aligned to the input's tail: `result[k]` is the EMA at `data[k + period - 1]`.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len() - period + 1);

    let seed: f64 = data[..period].iter().sum::<f64>() / period as f64;
    result.push(seed);

    for &value in &data[period..] {
        let prev = result[result.len() - 1];
        result.push((value - prev) * multiplier + prev);
    }

    result
}

/// Relative Strength Index (Wilder smoothing)
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for window in data.windows(2) {
        let change = window[1] - window[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut rsi_values = Vec::with_capacity(data.len() - period);
    rsi_values.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        rsi_values.push(rsi_from_averages(avg_gain, avg_loss));
    }

    rsi_values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// MACD (Moving Average Convergence Divergence)
#[derive(Debug, Clone, Default)]
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdResult {
    if fast_period == 0 || signal_period == 0 || slow_period <= fast_period {
        return MacdResult::default();
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);
    if ema_slow.is_empty() {
        return MacdResult::default();
    }

    // Both EMAs end on the last bar; the fast one simply starts earlier.
    let offset = ema_fast.len() - ema_slow.len();
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, slow)| ema_fast[i + offset] - slow)
        .collect();

    let signal_line = ema(&macd_line, signal_period);

    let hist_offset = macd_line.len() - signal_line.len();
    let histogram = signal_line
        .iter()
        .enumerate()
        .map(|(i, signal)| macd_line[i + hist_offset] - signal)
        .collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Look-back periods used when deriving an [`IndicatorSeries`] from closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPeriods {
    /// Fast to slow
    pub ema: [usize; 4],
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi: usize,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            ema: [9, 21, 50, 200],
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            rsi: 14,
        }
    }
}

impl IndicatorPeriods {
    /// Fewest closes that produce at least one aligned period.
    pub fn min_closes(&self) -> usize {
        let ema_need = self.ema.iter().copied().max().unwrap_or(0);
        let macd_need = self.macd_slow + self.macd_signal - 1;
        let rsi_need = self.rsi + 1;
        ema_need.max(macd_need).max(rsi_need)
    }

    fn check(&self) -> Result<(), AnalysisError> {
        if self.ema.iter().any(|&p| p == 0) || !self.ema.windows(2).all(|w| w[0] < w[1]) {
            return Err(AnalysisError::validation(
                "ema",
                "periods must be non-zero and strictly increasing",
            ));
        }
        if self.macd_fast == 0 || self.macd_signal == 0 || self.macd_slow <= self.macd_fast {
            return Err(AnalysisError::validation(
                "macd",
                "fast and signal periods must be non-zero and slow > fast",
            ));
        }
        if self.rsi == 0 {
            return Err(AnalysisError::validation("rsi", "period must be non-zero"));
        }
        Ok(())
    }
}

fn tail(values: Vec<f64>, len: usize) -> Vec<f64> {
    let skip = values.len().saturating_sub(len);
    values.into_iter().skip(skip).collect()
}

/// Build an aligned [`IndicatorSeries`] from daily closes (oldest first).
///
/// Every indicator ends on the last close; the longer outputs are truncated from
/// the front so all eight series share one length.
pub fn series_from_closes(
    closes: &[f64],
    periods: &IndicatorPeriods,
) -> Result<IndicatorSeries, AnalysisError> {
    periods.check()?;

    if let Some(idx) = closes.iter().position(|c| !c.is_finite()) {
        return Err(AnalysisError::validation(
            "closes",
            format!("non-finite value at index {}", idx),
        ));
    }

    let needed = periods.min_closes();
    if closes.len() < needed {
        return Err(AnalysisError::InsufficientData(format!(
            "Need at least {} closes to build indicator series, got {}",
            needed,
            closes.len()
        )));
    }

    let [fast, mid1, mid2, slow] = periods.ema;
    let emas = [
        ema(closes, fast),
        ema(closes, mid1),
        ema(closes, mid2),
        ema(closes, slow),
    ];
    let macd_result = macd(closes, periods.macd_fast, periods.macd_slow, periods.macd_signal);
    let rsi_values = rsi(closes, periods.rsi);

    let len = emas
        .iter()
        .map(Vec::len)
        .chain([
            macd_result.macd_line.len(),
            macd_result.signal_line.len(),
            macd_result.histogram.len(),
            rsi_values.len(),
        ])
        .min()
        .unwrap_or(0);

    let [ema_fast, ema_mid1, ema_mid2, ema_slow] = emas;

    Ok(IndicatorSeries {
        ema_fast: tail(ema_fast, len),
        ema_mid1: tail(ema_mid1, len),
        ema_mid2: tail(ema_mid2, len),
        ema_slow: tail(ema_slow, len),
        momentum_line: tail(macd_result.macd_line, len),
        momentum_signal: tail(macd_result.signal_line, len),
        momentum_histogram: tail(macd_result.histogram, len),
        oscillator: tail(rsi_values, len),
        as_of: None,
    })
}
