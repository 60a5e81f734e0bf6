use serde::Deserialize;

/// History window accepted by the chart endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    OneDay,
    FiveDays,
    OneMonth,
    TwoMonths,
}

impl Range {
    pub fn as_str(self) -> &'static str {
        match self {
            Range::OneDay => "1d",
            Range::FiveDays => "5d",
            Range::OneMonth => "1mo",
            Range::TwoMonths => "2mo",
        }
    }
}

/// Sampling interval accepted by the chart endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Hourly,
    Daily,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Hourly => "1h",
            Interval::Daily => "1d",
        }
    }
}

/// Top-level response from the v8 chart endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    pub quote: Vec<QuoteBlock>,
}

/// Close series for one symbol; entries can be null on halted candles
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Error object reported inside an otherwise-valid response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChartApiError {
    pub code: String,
    pub description: String,
}

/// Comprehensive error type for price-history operations
#[derive(Debug, Clone)]
pub enum ApiError {
    /// The endpoint answered but carried no usable close series
    NoData(String),
    /// Error object reported by the API itself
    Api(String),
    /// 404 Not Found (unknown symbol)
    NotFound(String),
    /// 429 Too Many Requests
    RateLimited,
    /// 5xx Server Error
    ServerError(u16, String),
    /// Other HTTP errors
    HttpError(u16, String),
    /// Request timed out
    Timeout,
    /// Network/request error
    RequestError(String),
    /// Deserialization error
    DeserializationError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NoData(symbol) => write!(f, "No price data for symbol '{}'", symbol),
            ApiError::Api(msg) => write!(f, "API error: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::RateLimited => write!(f, "Rate Limited"),
            ApiError::ServerError(code, msg) => write!(f, "Server Error ({}): {}", code, msg),
            ApiError::HttpError(code, msg) => write!(f, "HTTP Error ({}): {}", code, msg),
            ApiError::Timeout => write!(f, "Request timed out"),
            ApiError::RequestError(msg) => write!(f, "Request Error: {}", msg),
            ApiError::DeserializationError(msg) => write!(f, "Deserialization Error: {}", msg),
        }
    }
}
