//! Threshold-breach alerts and their identity keys

use std::hash::{Hash, Hasher};

use super::Period;

/// Identity of an alert: the (instrument name, symbol, period) triple.
///
/// Used for set membership in the daily dedup tracker. Two alerts with the
/// same key are the same alert regardless of message text or chart payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub name: String,
    pub symbol: String,
    pub period: Period,
}

/// A threshold breach for one instrument and one lookback period.
///
/// Created fresh each evaluation cycle, optionally given a rendered chart
/// before sending, and discarded after the email attempt.
#[derive(Debug, Clone)]
pub struct Alert {
    pub name: String,
    pub symbol: String,
    pub period: Period,
    pub message: String,
    pub chart: Option<Vec<u8>>,
}

impl Alert {
    pub fn new(name: &str, symbol: &str, period: Period, message: String) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            period,
            message,
            chart: None,
        }
    }

    /// The identity triple used for dedup set membership.
    pub fn key(&self) -> AlertKey {
        AlertKey {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            period: self.period,
        }
    }

    /// Attach a rendered PNG chart. The only permitted mutation after
    /// creation.
    pub fn attach_chart(&mut self, png: Vec<u8>) {
        self.chart = Some(png);
    }
}

// Equality and hashing are defined over the identity triple only, so that
// dedup treats alerts with differing messages or charts as the same alert.
impl PartialEq for Alert {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.symbol == other.symbol && self.period == other.period
    }
}

impl Eq for Alert {}

impl Hash for Alert {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.symbol.hash(state);
        self.period.hash(state);
    }
}
