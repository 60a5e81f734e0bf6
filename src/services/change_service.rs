//! Percentage-change computation over the fixed lookback windows

use thiserror::Error;
use tracing::warn;

use crate::models::{Period, PriceSnapshot};

/// Computation errors while deriving changes from a close series
#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("Reference close is zero for the {period} lookback")]
    ZeroReference { period: Period },
}

/// Derive the current price and the three percentage changes from an
/// ordered close series (oldest first).
///
/// Returns `None` when the series is empty (no data for the symbol).
/// A series shorter than a lookback window reports 0% for that period
/// rather than an error: the reference defaults to the current price.
/// A zero reference close is reported and leaves that period's change
/// unset, so only that period is skipped downstream.
pub fn compute_snapshot(closes: &[f64]) -> Option<PriceSnapshot> {
    let current = *closes.last()?;

    Some(PriceSnapshot {
        current,
        daily: checked_change(closes, current, Period::Daily),
        weekly: checked_change(closes, current, Period::Weekly),
        monthly: checked_change(closes, current, Period::Monthly),
    })
}

fn checked_change(closes: &[f64], current: f64, period: Period) -> Option<f64> {
    match percent_change(closes, current, period) {
        Ok(change) => Some(change),
        Err(e) => {
            warn!("Change computation skipped: {}", e);
            None
        }
    }
}

/// Change between the close `lookback + 1` observations from the end and
/// the current close, in percent.
fn percent_change(closes: &[f64], current: f64, period: Period) -> Result<f64, ChangeError> {
    let lookback = period.lookback();
    if closes.len() <= lookback {
        // Not enough history: report no change, matching the reference
        // defaulting to the current price.
        return Ok(0.0);
    }

    let reference = closes[closes.len() - 1 - lookback];
    if reference == 0.0 {
        return Err(ChangeError::ZeroReference { period });
    }

    Ok((current - reference) / reference * 100.0)
}
