//! Chart data models

use chrono::{DateTime, Utc};

/// A single observation in a price series: timestamp and closing price.
#[derive(Debug, Clone)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}
