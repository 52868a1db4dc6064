// src/api/mod.rs
//! Notion API interaction: the ability to read page content from a workspace.
//!
//! Layers, outermost first: `BlockTreeFetcher` builds whole page trees,
//! `RateLimitedClient` throttles and retries, and a `NotionTransport`
//! performs the actual HTTP call.

pub mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod pagination;
pub mod parser;
pub mod rate_limit;
pub mod responses;
pub mod tree_fetcher;

use client::{ApiRequest, ApiResponse, TransportFailure};

/// Sends one GET to the Notion API.
///
/// The only seam between the crawler and the network: production uses
/// `NotionHttpClient`, tests plug in an in-memory workspace.
#[async_trait::async_trait]
pub trait NotionTransport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse<String>, TransportFailure>;
}

// Re-export the public interface
pub use client::NotionHttpClient;
pub use rate_limit::{RateLimit, RateLimitedClient, RetryPolicy, TokenBucket};
pub use tree_fetcher::BlockTreeFetcher;
