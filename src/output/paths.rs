// src/output/paths.rs
//! Where crawled documents land on disk.

use crate::types::PageId;
use std::path::{Path, PathBuf};

/// `doc_<page_id>.md`, named by the 32-hex page id.
pub fn document_filename(page_id: &PageId) -> String {
    format!("doc_{}.md", page_id.as_str())
}

pub fn document_path(dir: &Path, page_id: &PageId) -> PathBuf {
    dir.join(document_filename(page_id))
}
