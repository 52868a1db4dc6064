// src/constants.rs
//! Domain constants that define the operational boundaries of a crawl.
//!
//! Each constant is named for the concept it constrains. Read together they
//! describe how the scraper behaves against the Notion API: how fast it asks,
//! how patiently it retries, how deep it descends.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// Base URL of the public Notion API.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// API version pinned in the `Notion-Version` header.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// How many blocks the Notion API returns per page of children.
///
/// 100 is the API maximum; using it keeps continuation round-trips rare.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// Maximum block nesting inside a single page before the tree is rejected.
///
/// Real pages rarely nest past a dozen levels. Hitting this limit means the
/// block graph of the page is malformed (a block reachable from itself).
pub const NOTION_MAX_BLOCK_DEPTH: usize = 50;

// ---------------------------------------------------------------------------
// Throttling
// ---------------------------------------------------------------------------

/// Token bucket capacity. Notion allows an average of three requests/second.
pub const RATE_LIMIT_CAPACITY: u32 = 3;

/// Tokens added back to the bucket per second.
pub const RATE_LIMIT_REFILL_PER_SECOND: f64 = 3.0;

/// Slowest accepted refill rate: one token every 1000 seconds.
pub const MIN_REFILL_PER_SECOND: f64 = 0.001;

/// Longest single sleep while waiting for a token. The bucket is checked
/// again after each sleep.
pub const MAX_TOKEN_WAIT: Duration = Duration::from_secs(60);

/// How many times a request answered with HTTP 429 is re-sent before giving up.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Wait applied after a 429 whose `Retry-After` header is missing or unreadable.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Transient failure backoff
// ---------------------------------------------------------------------------

/// First backoff delay after a transient failure.
pub const BACKOFF_BASE_DELAY: Duration = Duration::from_millis(200);

/// Multiplier applied to the delay after every failed attempt.
pub const BACKOFF_FACTOR: u32 = 2;

/// Total attempts (first try included) for a transiently failing request.
pub const BACKOFF_MAX_ATTEMPTS: u32 = 5;

/// Relative jitter applied to each backoff delay (0.2 = ±20%).
pub const BACKOFF_JITTER: f64 = 0.2;

/// Hard timeout for a single HTTP call, independent of the retry policy.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout handed to the HTTP client.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// Concurrent page fetches when the caller does not choose.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Upper bound on concurrent page fetches. More workers than this only queue
/// on the token bucket.
pub const MAX_CONCURRENCY: usize = 32;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters kept when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
