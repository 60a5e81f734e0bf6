//! Daily alert deduplication

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{Alert, AlertKey};

/// Alert identities already emailed since the last daily reset.
///
/// Owned exclusively by the monitor loop; grows monotonically within a day
/// and is cleared entirely when the local date changes.
pub struct SeenAlerts {
    seen: HashSet<AlertKey>,
    last_reset: NaiveDate,
}

impl SeenAlerts {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            seen: HashSet::new(),
            last_reset: today,
        }
    }

    /// True iff this alert's identity has not been notified today.
    pub fn should_notify(&self, alert: &Alert) -> bool {
        !self.seen.contains(&alert.key())
    }

    /// Record an alert as notified. Idempotent.
    pub fn mark_notified(&mut self, alert: &Alert) {
        self.seen.insert(alert.key());
    }

    /// Clear the set when the date has rolled over since the last reset.
    /// Returns true when a reset happened. Must run once per cycle, before
    /// evaluation, so dedup state never spans a date boundary.
    pub fn reset_if_new_day(&mut self, today: NaiveDate) -> bool {
        if today == self.last_reset {
            return false;
        }
        self.seen.clear();
        self.last_reset = today;
        true
    }

    /// Number of identities notified since the last reset.
    pub fn notified_today(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;

    fn day(ordinal: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, ordinal).unwrap()
    }

    fn alert(name: &str, period: Period) -> Alert {
        Alert::new(name, "SYM", period, format!("{name} dropped"))
    }

    #[test]
    fn test_mark_suppresses_until_rollover() {
        let mut seen = SeenAlerts::new(day(1));
        let a = alert("Gold", Period::Daily);

        assert!(seen.should_notify(&a));
        seen.mark_notified(&a);
        assert!(!seen.should_notify(&a));

        // Same day: still suppressed.
        assert!(!seen.reset_if_new_day(day(1)));
        assert!(!seen.should_notify(&a));
    }

    #[test]
    fn test_rollover_clears_all_identities() {
        let mut seen = SeenAlerts::new(day(1));
        let a = alert("Gold", Period::Daily);
        let b = alert("Bitcoin", Period::Weekly);
        seen.mark_notified(&a);
        seen.mark_notified(&b);
        assert_eq!(seen.notified_today(), 2);

        assert!(seen.reset_if_new_day(day(2)));

        assert!(seen.should_notify(&a));
        assert!(seen.should_notify(&b));
        assert_eq!(seen.notified_today(), 0);
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut seen = SeenAlerts::new(day(1));
        let a = alert("Gold", Period::Daily);

        seen.mark_notified(&a);
        seen.mark_notified(&a);
        assert_eq!(seen.notified_today(), 1);
    }

    #[test]
    fn test_identity_ignores_message_and_chart() {
        let mut seen = SeenAlerts::new(day(1));
        let mut first = alert("Gold", Period::Daily);
        first.attach_chart(vec![0u8; 16]);
        seen.mark_notified(&first);

        // Next cycle regenerates the alert with fresh message text and no
        // chart; it is still the same identity.
        let regenerated = Alert::new("Gold", "SYM", Period::Daily, "new text".to_string());
        assert!(!seen.should_notify(&regenerated));

        // A different period for the same instrument is a new identity.
        let weekly = alert("Gold", Period::Weekly);
        assert!(seen.should_notify(&weekly));
    }

    #[test]
    fn test_unsent_batch_is_retried_next_cycle() {
        // A failed send never calls mark_notified, so identical candidates
        // regenerated next cycle still pass the filter.
        let mut seen = SeenAlerts::new(day(1));
        let a = alert("Gold", Period::Daily);
        let b = alert("Bitcoin", Period::Weekly);

        let batch: Vec<&Alert> = [&a, &b]
            .into_iter()
            .filter(|alert| seen.should_notify(alert))
            .collect();
        assert_eq!(batch.len(), 2);

        // Transport failed: nothing marked. Both survive the next filter.
        assert!(seen.should_notify(&a));
        assert!(seen.should_notify(&b));
    }
}
