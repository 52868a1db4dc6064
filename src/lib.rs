// src/lib.rs
//! notion-scraper library: crawls Notion pages and extracts their text.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Entry point**: `load_pages`, `crawl_with_transport`
//! - **Error handling**: `CrawlError`, `NotionErrorCode`, `ValidationError`
//! - **Configuration**: `LoadOptions`, `CrawlConfig`, `CommandLineInput`
//! - **Domain model**: `PageTree`, `Block`, `BlockKind`, `TextFragment`
//! - **Domain types**: `PageId`, `BlockId`, `ApiKey`, `ValidatedUrl`
//! - **API client**: `NotionTransport`, `NotionHttpClient`, `RateLimitedClient`,
//!   `BlockTreeFetcher`
//! - **Crawl**: `PageGraphWalker`, `CrawlCoordinator`, `CrawlReport`
//! - **Formatting**: `TextExtractor`, `ExtractOptions`
//! - **Output**: `OutputPlan`, `deliver`

pub mod api;
pub mod config;
pub mod constants;
pub mod crawl;
pub mod error;
pub mod error_recovery;
pub mod formatting;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod types;

// --- Entry Point ---
pub use crate::pipeline::{build_coordinator, crawl_with_transport, load_pages, parse_page_ids};

// --- Error Handling ---
pub use crate::error::{CrawlError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{api_key_from_env, CommandLineInput, CrawlConfig, LoadOptions};

// --- Domain Model ---
pub use crate::model::{Block, BlockKind, ContainerKind, MediaKind, PageTree, TextFragment};

// --- Domain Types ---
pub use crate::types::{ApiKey, BlockId, PageId, ValidatedUrl};

// --- API Client ---
pub use crate::api::{
    client::{ApiRequest, ApiResponse, TransportFailure},
    BlockTreeFetcher, NotionHttpClient, NotionTransport, RateLimit, RateLimitedClient,
    RetryPolicy, TokenBucket,
};
pub use crate::error_recovery::BackoffPolicy;

// --- Crawl ---
pub use crate::crawl::{
    CrawlCoordinator, CrawlReport, NoopVisitor, PageDocument, PageGraphWalker, PageVisitor,
    SkippedPage,
};

// --- Formatting ---
pub use crate::formatting::{ExtractOptions, TextExtractor};

// --- Output ---
pub use crate::output::{deliver, document_filename, DeliveryTarget, OutputPlan, OutputReport};
