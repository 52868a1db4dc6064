//! Python bindings for notion-scraper via PyO3.
//!
//! Exposes the page loader as an awaitable `reader_load_data`, plus
//! `load_documents` for callers that want page ids alongside the text.

use pyo3::prelude::*;

mod pipeline;
mod types;

/// The main Python module: `notion_scraper._notion_scraper`
#[pymodule]
fn _notion_scraper(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(pipeline::reader_load_data, m)?)?;
    m.add_function(wrap_pyfunction!(pipeline::load_documents, m)?)?;

    m.add_class::<types::PyLoadOptions>()?;
    m.add_class::<types::PyPageDocument>()?;

    Ok(())
}
