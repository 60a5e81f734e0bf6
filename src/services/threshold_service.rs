//! Threshold evaluation: snapshot changes against configured limits

use crate::config::Thresholds;
use crate::models::{Alert, Instrument, Period, PriceSnapshot};

/// Compare an instrument's snapshot against the per-period thresholds and
/// build one alert per breached period.
///
/// Periods are checked in the fixed daily/weekly/monthly order and are
/// independent: an instrument can yield zero to three alerts per cycle.
/// A change exactly equal to the threshold counts as a breach; a period
/// whose change could not be computed is not evaluated.
pub fn evaluate(
    instrument: &Instrument,
    snapshot: &PriceSnapshot,
    thresholds: &Thresholds,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for period in Period::ALL {
        let Some(change) = snapshot.change(period) else {
            continue;
        };

        if change <= thresholds.for_period(period) {
            let message = format!(
                "{}: {:.2}% ({}) - Price: ${:.2}",
                instrument.name, change, period, snapshot.current
            );
            alerts.push(Alert::new(&instrument.name, &instrument.symbol, period, message));
        }
    }

    alerts
}
