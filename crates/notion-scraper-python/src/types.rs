//! Python wrapper types for notion-scraper configuration and results.

use notion_scraper::{
    api_key_from_env, parse_page_ids, ApiKey, LoadOptions, PageDocument, PageId, RateLimit,
};
use pyo3::prelude::*;

/// Crawl settings with Python-friendly construction.
#[pyclass(name = "LoadOptions")]
#[derive(Clone)]
pub struct PyLoadOptions {
    pub(crate) inner: LoadOptions,
}

#[pymethods]
impl PyLoadOptions {
    /// Args:
    ///     concurrency: Pages fetched at once (default 5)
    ///     max_depth: Maximum block nesting inside one page (default 50)
    ///     include_non_text_placeholders: Emit `[image: <url>]` style markers
    ///     include_titles: Put the page title on the first line
    ///     rate_limit_capacity: Token bucket burst size (default 3)
    ///     rate_limit_refill_per_second: Tokens added per second (default 3.0)
    #[new]
    #[pyo3(signature = (
        concurrency = 5,
        max_depth = 50,
        include_non_text_placeholders = false,
        include_titles = true,
        rate_limit_capacity = 3,
        rate_limit_refill_per_second = 3.0,
    ))]
    fn new(
        concurrency: usize,
        max_depth: usize,
        include_non_text_placeholders: bool,
        include_titles: bool,
        rate_limit_capacity: u32,
        rate_limit_refill_per_second: f64,
    ) -> PyResult<Self> {
        let inner = build_options(
            concurrency,
            max_depth,
            include_non_text_placeholders,
            include_titles,
            rate_limit_capacity,
            rate_limit_refill_per_second,
        )?;
        Ok(Self { inner })
    }

    #[getter]
    fn concurrency(&self) -> usize {
        self.inner.concurrency
    }

    #[getter]
    fn max_depth(&self) -> usize {
        self.inner.max_depth
    }

    fn __repr__(&self) -> String {
        format!(
            "LoadOptions(concurrency={}, max_depth={}, rate_limit=({}, {}))",
            self.inner.concurrency,
            self.inner.max_depth,
            self.inner.rate_limit.capacity,
            self.inner.rate_limit.refill_per_second
        )
    }
}

/// One crawled page.
#[pyclass(name = "PageDocument", frozen)]
pub struct PyPageDocument {
    #[pyo3(get)]
    page_id: String,
    #[pyo3(get)]
    root: String,
    #[pyo3(get)]
    text: String,
}

#[pymethods]
impl PyPageDocument {
    fn __repr__(&self) -> String {
        format!(
            "PageDocument(page_id='{}', root='{}', {} chars)",
            self.page_id,
            self.root,
            self.text.chars().count()
        )
    }
}

impl From<PageDocument> for PyPageDocument {
    fn from(doc: PageDocument) -> Self {
        Self {
            page_id: doc.page_id.to_hyphenated(),
            root: doc.root.to_hyphenated(),
            text: doc.text,
        }
    }
}

// --- Internal helpers ---

pub(crate) fn build_options(
    concurrency: usize,
    max_depth: usize,
    include_non_text_placeholders: bool,
    include_titles: bool,
    rate_limit_capacity: u32,
    rate_limit_refill_per_second: f64,
) -> PyResult<LoadOptions> {
    let options = LoadOptions {
        concurrency,
        max_depth,
        include_non_text_placeholders,
        include_titles,
        rate_limit: RateLimit {
            capacity: rate_limit_capacity,
            refill_per_second: rate_limit_refill_per_second,
        },
        ..LoadOptions::default()
    };
    options.validate().map_err(|e| {
        pyo3::exceptions::PyValueError::new_err(format!("Invalid options: {}", e))
    })?;
    Ok(options)
}

pub(crate) fn resolve_api_key(api_key: Option<&str>) -> PyResult<ApiKey> {
    match api_key {
        Some(key) => ApiKey::new(key).map_err(|e| {
            pyo3::exceptions::PyValueError::new_err(format!("Invalid API key: {}", e))
        }),
        None => api_key_from_env().map_err(|e| {
            pyo3::exceptions::PyValueError::new_err(format!(
                "{}. Pass api_key= or set NOTION_API_KEY.",
                e
            ))
        }),
    }
}

pub(crate) fn resolve_page_ids(page_ids: &[String]) -> PyResult<Vec<PageId>> {
    parse_page_ids(page_ids).map_err(|e| {
        pyo3::exceptions::PyValueError::new_err(format!("Invalid page ID: {}", e))
    })
}
