// src/error.rs
//! Crawl error types.
//!
//! Each variant names one way a crawl can fail and where. Transient
//! conditions are absorbed by the rate-limited client; what reaches the
//! walker is either recoverable (`PermissionDenied` on a non-root page) or
//! terminal, in which case the coordinator wraps it in `CrawlAborted`.

use crate::types::{PageId, ValidationError};
use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
///
/// Error bodies from the API carry a machine-readable `code`. Matching on
/// this enum instead of raw strings keeps classification in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded
    RateLimited,
    /// The requested object does not exist or is not shared with the integration
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parses a Notion API error code string.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "validation_error" => Self::ValidationFailed,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Creates a code from the HTTP status when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Main error type of the crawler.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("HTTP client setup failed: {0}")]
    HttpClientSetup(#[from] reqwest::Error),

    #[error("Transport failure for {endpoint} after {attempts} attempt(s): {message}")]
    Transport {
        endpoint: String,
        message: String,
        attempts: u32,
    },

    #[error("Rate limit still in effect for {endpoint} after {retries} retries")]
    RateLimitExceeded { endpoint: String, retries: u32 },

    #[error("Notion API rejected {endpoint} with HTTP {status} ({code}): {body}")]
    RequestRejected {
        endpoint: String,
        status: u16,
        code: NotionErrorCode,
        body: String,
    },

    #[error("Page {page_id} not found")]
    PageNotFound { page_id: PageId },

    #[error("Permission denied for page {page_id}: {reason}")]
    PermissionDenied { page_id: PageId, reason: String },

    #[error("Block tree of page {page_id} nests deeper than {max_depth} levels")]
    MaxDepthExceeded { page_id: PageId, max_depth: usize },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request to {endpoint} not sent: crawl cancelled")]
    Cancelled { endpoint: String },

    #[error("Crawl aborted at page {page_id}: {source}")]
    CrawlAborted {
        page_id: PageId,
        #[source]
        source: Box<CrawlError>,
    },

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output delivery failed: {}", failures.join("; "))]
    DeliveryFailed { failures: Vec<String> },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CrawlError {
    /// Wraps a terminal failure observed while processing `page_id`.
    pub fn aborted(page_id: PageId, cause: CrawlError) -> Self {
        Self::CrawlAborted {
            page_id,
            source: Box::new(cause),
        }
    }

    /// Whether this is the soft-skippable permission failure.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// The innermost cause, looking through `CrawlAborted` wrappers.
    pub fn root_cause(&self) -> &CrawlError {
        match self {
            Self::CrawlAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Re-labels an API rejection of a page request with page semantics.
    ///
    /// 404 becomes `PageNotFound` and 403 becomes `PermissionDenied`; anything
    /// else is returned unchanged.
    pub fn for_page(self, page_id: &PageId) -> Self {
        match self {
            Self::RequestRejected { status: 404, .. } => Self::PageNotFound {
                page_id: page_id.clone(),
            },
            Self::RequestRejected {
                status: 403,
                code,
                body,
                ..
            } => Self::PermissionDenied {
                page_id: page_id.clone(),
                reason: format!("{}: {}", code, body),
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for CrawlError {
    fn from(err: serde_json::Error) -> Self {
        CrawlError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = CrawlError> = std::result::Result<T, E>;
