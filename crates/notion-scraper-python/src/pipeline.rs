//! Python-exposed loader functions.

use crate::types::{build_options, resolve_api_key, resolve_page_ids, PyLoadOptions, PyPageDocument};
use notion_scraper::{crawl_with_transport, ApiKey, CrawlReport, LoadOptions, NotionHttpClient, PageId};
use pyo3::prelude::*;
use std::sync::Arc;

/// Crawl the given pages and everything they link to, returning one text
/// per page.
///
/// Args:
///     page_ids: Notion page URLs or 32-char hex IDs
///     api_key: Notion API key (reads NOTION_API_KEY / NOTION_TOKEN if None)
///     concurrency: Pages fetched at once (default 5)
///     max_depth: Maximum block nesting inside one page (default 50)
///     include_non_text_placeholders: Emit `[image: <url>]` style markers
///     rate_limit_capacity: Token bucket burst size (default 3)
///     rate_limit_refill_per_second: Tokens added per second (default 3.0)
///
/// Returns:
///     A list of strings in root order.
#[pyfunction]
#[pyo3(signature = (
    page_ids,
    api_key = None,
    concurrency = 5,
    max_depth = 50,
    include_non_text_placeholders = false,
    rate_limit_capacity = 3,
    rate_limit_refill_per_second = 3.0,
))]
#[allow(clippy::too_many_arguments)]
pub fn reader_load_data<'py>(
    py: Python<'py>,
    page_ids: Vec<String>,
    api_key: Option<&str>,
    concurrency: usize,
    max_depth: usize,
    include_non_text_placeholders: bool,
    rate_limit_capacity: u32,
    rate_limit_refill_per_second: f64,
) -> PyResult<Bound<'py, PyAny>> {
    let roots = resolve_page_ids(&page_ids)?;
    let api_key = resolve_api_key(api_key)?;
    let options = build_options(
        concurrency,
        max_depth,
        include_non_text_placeholders,
        true,
        rate_limit_capacity,
        rate_limit_refill_per_second,
    )?;

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let report = run_crawl(&roots, &api_key, &options).await?;
        Ok(report.into_texts())
    })
}

/// Like `reader_load_data`, but keeps page and root ids next to each text.
///
/// Args:
///     page_ids: Notion page URLs or 32-char hex IDs
///     api_key: Notion API key (reads NOTION_API_KEY / NOTION_TOKEN if None)
///     options: LoadOptions (defaults when None)
#[pyfunction]
#[pyo3(signature = (page_ids, api_key = None, options = None))]
pub fn load_documents<'py>(
    py: Python<'py>,
    page_ids: Vec<String>,
    api_key: Option<&str>,
    options: Option<PyLoadOptions>,
) -> PyResult<Bound<'py, PyAny>> {
    let roots = resolve_page_ids(&page_ids)?;
    let api_key = resolve_api_key(api_key)?;
    let options = options.map(|o| o.inner).unwrap_or_default();

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let report = run_crawl(&roots, &api_key, &options).await?;
        let documents: Vec<PyPageDocument> = report
            .documents
            .into_iter()
            .map(PyPageDocument::from)
            .collect();
        Ok(documents)
    })
}

// --- Internal helpers ---

async fn run_crawl(
    roots: &[PageId],
    api_key: &ApiKey,
    options: &LoadOptions,
) -> PyResult<CrawlReport> {
    let base_url = options.resolved_base_url().map_err(|e| {
        pyo3::exceptions::PyValueError::new_err(format!("Invalid base URL: {}", e))
    })?;
    let http_client = NotionHttpClient::new(api_key, &base_url).map_err(|e| {
        pyo3::exceptions::PyRuntimeError::new_err(format!("Failed to create HTTP client: {}", e))
    })?;

    crawl_with_transport(Arc::new(http_client), roots, options)
        .await
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("Crawl failed: {}", e)))
}
