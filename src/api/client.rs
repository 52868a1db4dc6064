// src/api/client.rs
//! Pure HTTP client wrapper for Notion API.
//!
//! This module provides a thin wrapper around reqwest for making
//! HTTP requests to the Notion API. It handles authentication and
//! basic request/response operations without parsing, throttling or retries.

use super::NotionTransport;
use crate::constants::{CONNECT_TIMEOUT, NOTION_API_VERSION};
use crate::error::CrawlError;
use crate::types::{ApiKey, ValidatedUrl};
use reqwest::{header, Client, Response, StatusCode};
use std::fmt;
use std::time::Duration;

/// A GET request against the Notion API, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Looks up a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: StatusCode,
    pub url: String,
    /// Parsed `Retry-After` header, when the server sent one.
    pub retry_after: Option<Duration>,
}

/// A request that never produced an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub message: String,
    /// Timeouts and connection failures are worth retrying; a request that
    /// could not even be built is not.
    pub transient: bool,
}

impl TransportFailure {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let transient = err.is_timeout() || err.is_connect() || err.is_request() || err.is_body();
        Self {
            message: err.to_string(),
            transient,
        }
    }
}

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey, base_url: &ValidatedUrl) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.as_base().to_string(),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, CrawlError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                CrawlError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl NotionTransport for NotionHttpClient {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse<String>, TransportFailure> {
        let url = format!("{}/{}", self.base_url, request.endpoint);
        log::debug!("GET {}", request);

        let response = self.client.get(url).query(&request.query).send().await?;
        extract_response_text(response).await
    }
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(
    response: Response,
) -> Result<ApiResponse<String>, TransportFailure> {
    let status = response.status();
    let url = response.url().to_string();
    let retry_after = parse_retry_after(response.headers());
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
        retry_after,
    })
}

/// Reads `Retry-After` as a number of seconds.
///
/// The HTTP-date form is not used by Notion and is ignored.
fn parse_retry_after(headers: &header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(header::RETRY_AFTER)?.to_str().ok()?.trim();
    let seconds: f64 = raw.parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::RETRY_AFTER,
            header::HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_retry_after_parsing() {
        assert_eq!(
            parse_retry_after(&headers_with("2")),
            Some(Duration::from_secs(2))
        );
        assert_eq!(
            parse_retry_after(&headers_with("0.5")),
            Some(Duration::from_millis(500))
        );
        assert_eq!(
            parse_retry_after(&headers_with("Wed, 21 Oct 2015 07:28:00 GMT")),
            None
        );
        assert_eq!(parse_retry_after(&header::HeaderMap::new()), None);
    }

    #[test]
    fn test_request_display_includes_query() {
        let request = ApiRequest::new("blocks/abc/children")
            .with_query("page_size", "100")
            .with_query("start_cursor", "xyz");
        assert_eq!(
            request.to_string(),
            "blocks/abc/children?page_size=100&start_cursor=xyz"
        );
        assert_eq!(request.query_value("start_cursor"), Some("xyz"));
        assert_eq!(request.query_value("missing"), None);
    }

    #[test]
    fn test_client_builds_with_valid_key() {
        let key = ApiKey::new("secret_abcdefghijklmnopqrstuvwxyz").unwrap();
        let base = ValidatedUrl::parse("https://api.notion.com/v1/").unwrap();
        let client = NotionHttpClient::new(&key, &base).unwrap();
        assert_eq!(client.base_url, "https://api.notion.com/v1");
    }
}
