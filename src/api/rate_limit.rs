// src/api/rate_limit.rs
//! Throttled, retrying access to the Notion API.
//!
//! `RateLimitedClient` is the only way the crawler talks to the network. It
//! takes a token from a shared bucket before every HTTP call, honours
//! `Retry-After` on 429s, backs off on transient failures and turns every
//! other non-success status into `CrawlError::RequestRejected`.

use super::client::{ApiRequest, ApiResponse};
use super::parser::parse_rejection;
use super::NotionTransport;
use crate::constants::{
    DEFAULT_RETRY_AFTER, MAX_RATE_LIMIT_RETRIES, MAX_TOKEN_WAIT, RATE_LIMIT_CAPACITY,
    RATE_LIMIT_REFILL_PER_SECOND, REQUEST_TIMEOUT,
};
use crate::error::CrawlError;
use crate::error_recovery::{retry_with_backoff, Attempt, BackoffPolicy};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimit {
    pub capacity: u32,
    pub refill_per_second: f64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            capacity: RATE_LIMIT_CAPACITY,
            refill_per_second: RATE_LIMIT_REFILL_PER_SECOND,
        }
    }
}

/// How stubbornly a request is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Re-sends after a 429 before failing with `RateLimitExceeded`.
    pub max_rate_limit_retries: u32,
    /// Wait after a 429 that carries no usable `Retry-After`.
    pub default_retry_after: Duration,
    /// Schedule for timeouts, connection failures and 5xx.
    pub backoff: BackoffPolicy,
    /// Hard limit on a single HTTP call.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: MAX_RATE_LIMIT_RETRIES,
            default_retry_after: DEFAULT_RETRY_AFTER,
            backoff: BackoffPolicy::default(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Shared token bucket. Starts full.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_second: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(limit: RateLimit) -> Self {
        let capacity = f64::from(limit.capacity.max(1));
        Self {
            capacity,
            refill_per_second: limit.refill_per_second,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Takes a token, or reports how long until one is available.
    fn try_take(&self) -> Result<(), Duration> {
        let mut state = self.state.lock();
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_per_second).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - state.tokens;
            let wait = Duration::try_from_secs_f64(missing / self.refill_per_second)
                .unwrap_or(MAX_TOKEN_WAIT)
                .min(MAX_TOKEN_WAIT);
            Err(wait.max(Duration::from_millis(1)))
        }
    }

    /// Suspends the calling task until a token is available and takes it.
    pub async fn acquire(&self) {
        loop {
            match self.try_take() {
                Ok(()) => return,
                Err(wait) => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Tokens currently in the bucket, refill included.
    pub fn available(&self) -> f64 {
        let state = self.state.lock();
        let elapsed = Instant::now()
            .saturating_duration_since(state.last_refill)
            .as_secs_f64();
        (state.tokens + elapsed * self.refill_per_second).min(self.capacity)
    }
}

/// Notion API access with throttling and retries. Share it behind an `Arc`.
pub struct RateLimitedClient {
    transport: Arc<dyn NotionTransport>,
    bucket: TokenBucket,
    policy: RetryPolicy,
}

impl RateLimitedClient {
    pub fn new(transport: Arc<dyn NotionTransport>, limit: RateLimit, policy: RetryPolicy) -> Self {
        Self {
            transport,
            bucket: TokenBucket::new(limit),
            policy,
        }
    }

    /// Sends a GET and returns the successful response.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse<String>, CrawlError> {
        let counter = AtomicU32::new(0);
        let rate_limited = &counter;

        retry_with_backoff(&self.policy.backoff, move |attempt| {
            self.attempt(request, attempt, rate_limited)
        })
        .await
        .inspect_err(|failure| {
            if failure.exhausted {
                log::error!(
                    "Giving up on {} after {} attempts: {}",
                    request,
                    failure.attempts,
                    failure.error
                );
            }
        })
        .map_err(|failure| match failure.error {
            CrawlError::Transport {
                endpoint, message, ..
            } => CrawlError::Transport {
                endpoint,
                message,
                attempts: failure.attempts,
            },
            other => other,
        })
    }

    /// One backoff attempt. 429s are absorbed here and do not use up attempts.
    async fn attempt(
        &self,
        request: &ApiRequest,
        attempt: u32,
        rate_limited: &AtomicU32,
    ) -> Result<ApiResponse<String>, Attempt<CrawlError>> {
        let endpoint = request.to_string();

        loop {
            self.bucket.acquire().await;

            let outcome =
                tokio::time::timeout(self.policy.request_timeout, self.transport.get(request)).await;

            let response = match outcome {
                Err(_) => {
                    return Err(Attempt::Transient(transport_error(
                        &endpoint,
                        format!("request timed out after {:?}", self.policy.request_timeout),
                        attempt,
                    )))
                }
                Ok(Err(failure)) if failure.transient => {
                    return Err(Attempt::Transient(transport_error(
                        &endpoint,
                        failure.message,
                        attempt,
                    )))
                }
                Ok(Err(failure)) => {
                    return Err(Attempt::Fatal(transport_error(
                        &endpoint,
                        failure.message,
                        attempt,
                    )))
                }
                Ok(Ok(response)) => response,
            };

            let status = response.status;
            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retries = rate_limited.fetch_add(1, Ordering::SeqCst) + 1;
                if retries > self.policy.max_rate_limit_retries {
                    return Err(Attempt::Fatal(CrawlError::RateLimitExceeded {
                        endpoint,
                        retries: self.policy.max_rate_limit_retries,
                    }));
                }
                let wait = response
                    .retry_after
                    .unwrap_or(self.policy.default_retry_after);
                log::warn!(
                    "Rate limited on {} (retry {}/{}), waiting {:?}",
                    endpoint,
                    retries,
                    self.policy.max_rate_limit_retries,
                    wait
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if is_transient_status(status) {
                if let Some(wait) = response.retry_after {
                    tokio::time::sleep(wait).await;
                }
                return Err(Attempt::Transient(transport_error(
                    &endpoint,
                    format!("HTTP {}", status),
                    attempt,
                )));
            }

            return Err(Attempt::Fatal(parse_rejection(&endpoint, &response)));
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}

fn transport_error(endpoint: &str, message: String, attempts: u32) -> CrawlError {
    CrawlError::Transport {
        endpoint: endpoint.to_string(),
        message,
        attempts,
    }
}
