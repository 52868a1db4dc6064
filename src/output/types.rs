// src/output/types.rs
//! Type definitions for output operations.
//!
//! Planning is pure: a plan lists what should happen to the crawled
//! documents, and only `writer::deliver` touches the filesystem or stdout.

use super::paths::document_path;
use crate::crawl::PageDocument;
use std::path::{Path, PathBuf};

/// Represents a complete output plan.
#[derive(Debug, Clone, Default)]
pub struct OutputPlan {
    /// List of operations to perform
    pub operations: Vec<DeliveryTarget>,
}

impl OutputPlan {
    /// Creates a new empty output plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation to the plan.
    pub fn with_operation(mut self, operation: DeliveryTarget) -> Self {
        self.operations.push(operation);
        self
    }

    /// One `doc_<page_id>.md` per document when `dir` is given, otherwise the
    /// documents printed to stdout separated by blank lines.
    pub fn for_documents(documents: &[PageDocument], dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => documents.iter().fold(
                Self::new().with_operation(DeliveryTarget::CreateDirectory {
                    path: dir.to_path_buf(),
                }),
                |plan, doc| {
                    plan.with_operation(DeliveryTarget::WriteFile {
                        path: document_path(dir, &doc.page_id),
                        content: doc.text.clone(),
                    })
                },
            ),
            None if documents.is_empty() => Self::new(),
            None => {
                let mut content = documents
                    .iter()
                    .map(|doc| doc.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                content.push('\n');
                Self::new().with_operation(DeliveryTarget::PrintToStdout { content })
            }
        }
    }
}

/// Represents a single output operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// Write content to a file
    WriteFile { path: PathBuf, content: String },
    /// Create a directory
    CreateDirectory { path: PathBuf },
    /// Print to stdout
    PrintToStdout { content: String },
}

/// Result of executing an output plan.
#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    /// Successfully completed operations
    pub completed: Vec<CompletedOperation>,
    /// Failed operations with errors
    pub failed: Vec<FailedOperation>,
    /// Execution statistics
    pub stats: ExecutionStats,
}

impl OutputReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a completed operation to the report.
    pub fn with_completed(mut self, operation: CompletedOperation) -> Self {
        self.stats.operations_completed += 1;
        self.stats.bytes_written += operation.bytes_written;
        self.completed.push(operation);
        self
    }

    /// Adds a failed operation to the report.
    pub fn with_failed(mut self, operation: FailedOperation) -> Self {
        self.stats.operations_failed += 1;
        self.failed.push(operation);
        self
    }

    /// Checks if all operations succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Paths of the files that were written.
    pub fn written_files(&self) -> Vec<&Path> {
        self.completed
            .iter()
            .filter_map(|done| match &done.operation {
                DeliveryTarget::WriteFile { path, .. } => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }
}

/// A successfully completed operation.
#[derive(Debug, Clone)]
pub struct CompletedOperation {
    pub operation: DeliveryTarget,
    pub bytes_written: usize,
    pub duration_ms: u64,
}

/// A failed operation with error information.
#[derive(Debug, Clone)]
pub struct FailedOperation {
    pub operation: DeliveryTarget,
    pub error: String,
}

/// Execution statistics.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    pub operations_completed: usize,
    pub operations_failed: usize,
    pub bytes_written: usize,
    pub total_duration_ms: u64,
}
