// src/output/mod.rs
//! Output handling with clear separation of planning and execution.
//!
//! Plans are built from crawl results by pure functions; `deliver` performs
//! the I/O and reports per-operation success.

mod paths;
mod types;
mod writer;

// Re-export the public interface
pub use paths::{document_filename, document_path};
pub use types::{
    CompletedOperation, DeliveryTarget, ExecutionStats, FailedOperation, OutputPlan, OutputReport,
};
pub use writer::deliver;
