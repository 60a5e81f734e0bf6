//! Price snapshot models

use super::Period;

/// Current price plus percentage change over the three lookback windows.
/// Produced fresh on every evaluation cycle; never persisted.
///
/// A change is `None` when its computation was skipped (zero reference
/// close); that period is simply not evaluated this cycle.
#[derive(Debug, Clone, Copy)]
pub struct PriceSnapshot {
    pub current: f64,
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
}

impl PriceSnapshot {
    /// Percentage change for the given lookback period, if it could be
    /// computed.
    pub fn change(&self, period: Period) -> Option<f64> {
        match period {
            Period::Daily => self.daily,
            Period::Weekly => self.weekly,
            Period::Monthly => self.monthly,
        }
    }
}
