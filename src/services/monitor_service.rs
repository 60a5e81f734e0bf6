//! The evaluation loop: fetch, evaluate, dedup, notify
//!
//! One cycle runs to completion before the next sleep begins. Per-cycle
//! failures (fetch, compute, render, send) are absorbed and logged; nothing
//! short of process shutdown stops the loop.

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::yahoo::{Interval, Range, YahooFinanceClient};
use crate::config::MonitorConfig;
use crate::models::{Alert, Period};
use crate::services::chart_service::{self, CHART_HEIGHT, CHART_WIDTH};
use crate::services::dedup_service::SeenAlerts;
use crate::services::mail_service::{MailError, Mailer};
use crate::services::{change_service, threshold_service};

/// Startup failures that abort the process before the loop begins
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to build HTTP client: {0}")]
    Http(String),
    #[error("Failed to configure SMTP transport: {0}")]
    Mail(#[from] MailError),
}

/// Long-running monitor owning the price client, the mailer and the
/// daily dedup state.
pub struct Monitor {
    config: MonitorConfig,
    client: YahooFinanceClient,
    mailer: Option<Mailer>,
    seen: SeenAlerts,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Result<Self, StartupError> {
        let client = YahooFinanceClient::new().map_err(|e| StartupError::Http(e.to_string()))?;

        let mailer = if config.can_send() {
            Some(Mailer::from_config(&config)?)
        } else {
            None
        };

        Ok(Self {
            config,
            client,
            mailer,
            seen: SeenAlerts::new(Local::now().date_naive()),
        })
    }

    /// Run forever on the configured interval. The first evaluation happens
    /// immediately; later ones wait out the full interval.
    pub async fn run(&mut self) {
        info!(
            "Monitoring {} instrument(s) every {}s",
            self.config.instruments.len(),
            self.config.interval.as_secs()
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.cycle(Local::now()).await;
        }
    }

    /// One full evaluation cycle: daily reset, candidate collection, dedup
    /// filter, best-effort charts, delivery, mark-on-success.
    pub async fn cycle(&mut self, now: DateTime<Local>) {
        info!("Evaluation cycle - {}", now.format("%Y-%m-%d %H:%M:%S"));

        if self.seen.reset_if_new_day(now.date_naive()) {
            info!("Reset daily alert tracker");
        }

        let candidates = self.collect_candidates().await;
        let mut fresh: Vec<Alert> = candidates
            .into_iter()
            .filter(|alert| self.seen.should_notify(alert))
            .collect();

        if fresh.is_empty() {
            info!("No new alerts");
            return;
        }

        self.attach_charts(&mut fresh).await;

        match &self.mailer {
            Some(mailer) => match mailer.send_alerts(&fresh, now.date_naive()).await {
                Ok(()) => {
                    info!("Sent alert email with {} alert(s)", fresh.len());
                    for alert in &fresh {
                        self.seen.mark_notified(alert);
                    }
                    debug!(
                        "{} identities notified since last reset",
                        self.seen.notified_today()
                    );
                }
                Err(e) => {
                    // Batch stays unmarked so the same alerts regenerate
                    // and retry next cycle.
                    error!("Alert email failed, batch will retry next cycle: {}", e);
                }
            },
            None => {
                for alert in &fresh {
                    warn!("Email delivery disabled, alert not sent: {}", alert.message);
                    self.seen.mark_notified(alert);
                }
            }
        }
    }

    /// Evaluate every configured instrument. A fetch or computation failure
    /// skips that instrument and leaves the rest of the cycle intact.
    async fn collect_candidates(&self) -> Vec<Alert> {
        let mut candidates = Vec::new();

        for instrument in &self.config.instruments {
            let series = match self
                .client
                .fetch_series(&instrument.symbol, Range::TwoMonths, Interval::Daily)
                .await
            {
                Ok(series) => series,
                Err(e) => {
                    warn!("Price fetch failed for {}: {}", instrument.symbol, e);
                    continue;
                }
            };

            let closes: Vec<f64> = series.iter().map(|p| p.price).collect();
            let Some(snapshot) = change_service::compute_snapshot(&closes) else {
                warn!("No price data for {}", instrument.symbol);
                continue;
            };

            debug!(
                "{}: ${:.2} | 1d: {} | 1w: {} | 1mo: {}",
                instrument.name,
                snapshot.current,
                fmt_change(snapshot.daily),
                fmt_change(snapshot.weekly),
                fmt_change(snapshot.monthly)
            );

            candidates.extend(threshold_service::evaluate(
                instrument,
                &snapshot,
                &self.config.thresholds,
            ));
        }

        candidates
    }

    /// Fetch the period-appropriate series and render a chart for each
    /// alert. Best effort: failures are logged and the alert ships without
    /// an image.
    async fn attach_charts(&self, alerts: &mut [Alert]) {
        for alert in alerts.iter_mut() {
            let (range, interval) = chart_window(alert.period);

            let points = match self.client.fetch_series(&alert.symbol, range, interval).await {
                Ok(points) => points,
                Err(e) => {
                    warn!("Chart data fetch failed for {} ({}): {}", alert.name, alert.period, e);
                    continue;
                }
            };

            let title = format!("{} Price Evolution", alert.name);
            match chart_service::render_price_chart(&points, &title, CHART_WIDTH, CHART_HEIGHT) {
                Ok(png) => alert.attach_chart(png),
                Err(e) => {
                    warn!("Chart rendering failed for {} ({}): {}", alert.name, alert.period, e)
                }
            }
        }
    }
}

fn fmt_change(change: Option<f64>) -> String {
    match change {
        Some(value) => format!("{:.2}%", value),
        None => "n/a".to_string(),
    }
}

/// History window used for the chart attached to an alert of the given
/// period.
fn chart_window(period: Period) -> (Range, Interval) {
    match period {
        Period::Daily => (Range::OneDay, Interval::Hourly),
        Period::Weekly => (Range::FiveDays, Interval::Hourly),
        Period::Monthly => (Range::OneMonth, Interval::Daily),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_windows_match_periods() {
        assert_eq!(chart_window(Period::Daily), (Range::OneDay, Interval::Hourly));
        assert_eq!(chart_window(Period::Weekly), (Range::FiveDays, Interval::Hourly));
        assert_eq!(chart_window(Period::Monthly), (Range::OneMonth, Interval::Daily));
    }
}
