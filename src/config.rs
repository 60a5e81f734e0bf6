//! Process configuration
//!
//! All recognized options are read once at startup into an immutable
//! `MonitorConfig`. Missing email credentials disable delivery but never
//! abort the process; an unparsable `INTERVAL` does.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::models::{Instrument, Period};

/// Configuration errors that abort startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("INTERVAL must be a number of seconds, got '{0}'")]
    InvalidInterval(String),
}

/// Per-period alert thresholds, in percent. A change at or below the
/// threshold is a breach.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

impl Thresholds {
    pub fn for_period(&self, period: Period) -> f64 {
        match period {
            Period::Daily => self.daily,
            Period::Weekly => self.weekly,
            Period::Monthly => self.monthly,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            daily: -2.0,
            weekly: -5.0,
            monthly: -10.0,
        }
    }
}

/// Immutable runtime configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: String,
    pub interval: Duration,
    pub instruments: Vec<Instrument>,
    pub thresholds: Thresholds,
}

impl MonitorConfig {
    const DEFAULT_INTERVAL_SECS: u64 = 90;

    // Implicit TLS SMTP
    const SMTP_PORT: u16 = 465;

    /// Read configuration from the environment, falling back to defaults
    /// for everything except credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        let interval_secs = match env::var("INTERVAL") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidInterval(raw))?,
            Err(_) => Self::DEFAULT_INTERVAL_SECS,
        };

        Ok(Self {
            smtp_server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: Self::SMTP_PORT,
            sender_email: env::var("SENDER_EMAIL").unwrap_or_default(),
            sender_password: env::var("SENDER_PASSWORD").unwrap_or_default(),
            recipient_email: env::var("RECIPIENT_EMAIL").unwrap_or_default(),
            interval: Duration::from_secs(interval_secs),
            instruments: Self::default_instruments(),
            thresholds: Thresholds::default(),
        })
    }

    /// Email delivery needs sender, password and recipient; anything less
    /// runs the monitor in evaluate-and-log mode.
    pub fn can_send(&self) -> bool {
        !self.sender_email.is_empty()
            && !self.sender_password.is_empty()
            && !self.recipient_email.is_empty()
    }

    fn default_instruments() -> Vec<Instrument> {
        vec![
            Instrument::new("SP500", "^GSPC"),
            Instrument::new("Bitcoin", "BTC-USD"),
            Instrument::new("Gold", "GC=F"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> MonitorConfig {
        MonitorConfig {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            sender_email: String::new(),
            sender_password: String::new(),
            recipient_email: String::new(),
            interval: Duration::from_secs(90),
            instruments: MonitorConfig::default_instruments(),
            thresholds: Thresholds::default(),
        }
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.for_period(Period::Daily), -2.0);
        assert_eq!(thresholds.for_period(Period::Weekly), -5.0);
        assert_eq!(thresholds.for_period(Period::Monthly), -10.0);
    }

    #[test]
    fn test_can_send_requires_all_credentials() {
        let mut config = bare_config();
        assert!(!config.can_send());

        config.sender_email = "sender@example.com".to_string();
        config.recipient_email = "recipient@example.com".to_string();
        assert!(!config.can_send());

        config.sender_password = "password".to_string();
        assert!(config.can_send());
    }

    #[test]
    fn test_default_universe() {
        let config = bare_config();
        let symbols: Vec<&str> = config.instruments.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, ["^GSPC", "BTC-USD", "GC=F"]);
    }
}
