use std::time::Duration;

use chrono::DateTime;
use reqwest::Client as HttpClient;

use super::models::{ApiError, ChartResponse, Interval, Range};
use crate::models::PricePoint;

/// Yahoo Finance chart API client for fetching close-price history
pub struct YahooFinanceClient {
    http_client: HttpClient,
    base_url: String,
}

impl YahooFinanceClient {
    const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com/v8/finance/chart";

    /// The endpoint rejects requests without a browser-like user agent
    const USER_AGENT: &'static str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) vigil/0.1";

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a new chart API client with a bounded request timeout
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(Self::USER_AGENT)
            .build()
            .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// GET /{symbol}?range=..&interval=..
    ///
    /// Fetches the close-price history for a symbol over the given window,
    /// oldest first. Null closes (halted candles) are dropped.
    ///
    /// # Returns
    /// * `Ok(Vec<PricePoint>)` - Non-empty, time-ordered close series
    /// * `Err(ApiError)` - `NoData` when the symbol has no usable closes,
    ///   otherwise the transport/HTTP/decode failure
    pub async fn fetch_series(
        &self,
        symbol: &str,
        range: Range,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, ApiError> {
        let url = format!("{}/{}", self.base_url, symbol);

        let response = self
            .http_client
            .get(&url)
            .query(&[("range", range.as_str()), ("interval", interval.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout
                } else {
                    ApiError::RequestError(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let payload = response
            .json::<ChartResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))?;

        Self::extract_points(symbol, payload)
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            404 => ApiError::NotFound(body_text),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(status_code, body_text),
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    /// Flatten the chart envelope into an ordered close series
    fn extract_points(symbol: &str, payload: ChartResponse) -> Result<Vec<PricePoint>, ApiError> {
        if let Some(err) = payload.chart.error {
            return Err(ApiError::Api(format!("{}: {}", err.code, err.description)));
        }

        let result = payload
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| ApiError::NoData(symbol.to_string()))?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|quote| quote.close)
            .unwrap_or_default();

        let mut points = Vec::new();
        for (ts, close) in result.timestamp.iter().zip(closes) {
            let Some(price) = close else { continue };
            if let Some(timestamp) = DateTime::from_timestamp(*ts, 0) {
                points.push(PricePoint { timestamp, price });
            }
        }

        if points.is_empty() {
            return Err(ApiError::NoData(symbol.to_string()));
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ChartResponse {
        serde_json::from_str(body).expect("payload should deserialize")
    }

    #[test]
    fn test_extract_points_drops_null_closes() {
        let payload = parse(
            r#"{"chart":{"result":[{"timestamp":[1700000000,1700086400,1700172800],
                "indicators":{"quote":[{"close":[100.0,null,105.5]}]}}],"error":null}}"#,
        );

        let points = YahooFinanceClient::extract_points("GC=F", payload).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price, 100.0);
        assert_eq!(points[1].price, 105.5);
        assert!(points[0].timestamp < points[1].timestamp);
    }

    #[test]
    fn test_extract_points_empty_result_is_no_data() {
        let payload = parse(r#"{"chart":{"result":[],"error":null}}"#);

        let err = YahooFinanceClient::extract_points("DUMMY", payload).unwrap_err();
        assert!(matches!(err, ApiError::NoData(symbol) if symbol == "DUMMY"));
    }

    #[test]
    fn test_extract_points_all_null_closes_is_no_data() {
        let payload = parse(
            r#"{"chart":{"result":[{"timestamp":[1700000000,1700086400],
                "indicators":{"quote":[{"close":[null,null]}]}}],"error":null}}"#,
        );

        let err = YahooFinanceClient::extract_points("DUMMY", payload).unwrap_err();
        assert!(matches!(err, ApiError::NoData(_)));
    }

    #[test]
    fn test_extract_points_surfaces_api_error() {
        let payload = parse(
            r#"{"chart":{"result":null,
                "error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );

        let err = YahooFinanceClient::extract_points("OLD", payload).unwrap_err();
        assert!(matches!(err, ApiError::Api(msg) if msg.contains("delisted")));
    }
}
