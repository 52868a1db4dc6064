// src/pipeline.rs
//! Library entry points: page ids in, extracted texts out.
//!
//! `load_pages` wires the real HTTP transport; `crawl_with_transport` takes
//! any `NotionTransport` and returns the full `CrawlReport`.

use crate::api::{BlockTreeFetcher, NotionHttpClient, NotionTransport, RateLimitedClient};
use crate::config::LoadOptions;
use crate::crawl::{CrawlCoordinator, CrawlReport};
use crate::error::CrawlError;
use crate::formatting::TextExtractor;
use crate::types::{ApiKey, PageId};
use std::sync::Arc;

/// Parses user-supplied ids (32-hex, dashed UUID or Notion URL).
pub fn parse_page_ids<S: AsRef<str>>(raw: &[S]) -> Result<Vec<PageId>, CrawlError> {
    raw.iter()
        .map(|id| PageId::parse(id.as_ref()).map_err(CrawlError::from))
        .collect()
}

/// Crawls every page reachable from `page_ids` and returns one text per page.
///
/// Texts come in root order: each root first, then the pages discovered
/// from it. Any failure other than a denied non-root page aborts the whole
/// load.
pub async fn load_pages<S: AsRef<str>>(
    page_ids: &[S],
    api_key: &ApiKey,
    options: &LoadOptions,
) -> Result<Vec<String>, CrawlError> {
    let roots = parse_page_ids(page_ids)?;
    options.validate()?;
    let base_url = options.resolved_base_url()?;
    let transport = Arc::new(NotionHttpClient::new(api_key, &base_url)?);

    let report = crawl_with_transport(transport, &roots, options).await?;
    Ok(report.into_texts())
}

/// Runs a crawl over an arbitrary transport.
pub async fn crawl_with_transport(
    transport: Arc<dyn NotionTransport>,
    roots: &[PageId],
    options: &LoadOptions,
) -> Result<CrawlReport, CrawlError> {
    options.validate()?;
    let coordinator = build_coordinator(transport, options);
    coordinator.crawl(roots).await
}

/// Assembles the component stack described by `options`.
pub fn build_coordinator(transport: Arc<dyn NotionTransport>, options: &LoadOptions) -> CrawlCoordinator {
    let client = Arc::new(RateLimitedClient::new(
        transport,
        options.rate_limit,
        options.retry.clone(),
    ));
    let fetcher = Arc::new(BlockTreeFetcher::new(client, options.max_depth));
    CrawlCoordinator::new(
        fetcher,
        options.concurrency,
        TextExtractor::new(options.extract_options()),
    )
}
