//! Data models for the monitor's instruments, prices and alerts
//!
//! This module organizes the value types passed between the price client and
//! the evaluation/notification services. Models carry no behavior beyond
//! identity and formatting; the services own all logic.

pub mod alert;
pub mod chart;
pub mod instrument;
pub mod period;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use alert::{Alert, AlertKey};
pub use chart::PricePoint;
pub use instrument::Instrument;
pub use period::Period;
pub use snapshot::PriceSnapshot;
