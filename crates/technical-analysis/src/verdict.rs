use analysis_core::{Polarity, TechnicalSignal};

/// Outcome row of an indicator decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub polarity: Polarity,
    pub strength: u8,
    pub reason: &'static str,
}

impl Verdict {
    pub const fn new(polarity: Polarity, strength: u8, reason: &'static str) -> Self {
        Self {
            polarity,
            strength,
            reason,
        }
    }

    /// Materialize into a signal, appending the observed values to the reason.
    pub fn to_signal(&self, indicator_name: &str, detail: &str) -> TechnicalSignal {
        let reason = if detail.is_empty() {
            self.reason.to_string()
        } else {
            format!("{} ({})", self.reason, detail)
        };
        TechnicalSignal::new(indicator_name, self.polarity, self.strength, reason)
    }
}
