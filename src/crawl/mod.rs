// src/crawl/mod.rs
//! Page graph traversal and crawl orchestration.

pub mod coordinator;
pub mod state;
pub mod walker;

pub use coordinator::{CrawlCoordinator, CrawlReport, PageDocument};
pub use state::{SkippedPage, VisitedPage, WalkOutcome};
pub use walker::{NoopVisitor, PageGraphWalker, PageVisitor};
