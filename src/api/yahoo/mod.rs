pub mod client;
pub mod models;

pub use client::YahooFinanceClient;
pub use models::{ApiError, Interval, Range};
