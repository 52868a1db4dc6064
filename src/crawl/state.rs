// src/crawl/state.rs
//! Bookkeeping for one crawl: which pages were seen, which wait, what came out.

use crate::types::PageId;
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

/// A page scheduled for fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub page_id: PageId,
    /// Index of the root this page is attributed to.
    pub origin: usize,
    /// Link distance from that root; roots are at 0.
    pub depth: usize,
}

impl Discovered {
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// A fetched page with whatever the visitor produced for it.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitedPage<O> {
    pub page_id: PageId,
    pub origin: usize,
    pub depth: usize,
    pub output: O,
}

/// A non-root page that was skipped because access was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    pub page_id: PageId,
    pub origin: usize,
    pub reason: String,
}

/// Result of walking the page graph.
#[derive(Debug, Clone)]
pub struct WalkOutcome<O> {
    /// Distinct root ids in input order.
    pub roots: Vec<PageId>,
    /// Grouped by root in input order, discovery order within a root.
    pub pages: Vec<VisitedPage<O>>,
    pub skipped: Vec<SkippedPage>,
}

/// Mutable state of one crawl.
///
/// Owned by the walker's dispatch loop; workers never touch it.
#[derive(Debug)]
pub struct CrawlState<O> {
    roots: Vec<PageId>,
    visited: IndexSet<PageId>,
    pending: VecDeque<Discovered>,
    results: IndexMap<PageId, VisitedPage<O>>,
    skipped: Vec<SkippedPage>,
}

impl<O> CrawlState<O> {
    /// Seeds the crawl. Every root is marked visited up front so that a root
    /// reachable from an earlier root is still attributed to itself.
    pub fn with_roots(roots: &[PageId]) -> Self {
        let mut state = Self {
            roots: Vec::new(),
            visited: IndexSet::new(),
            pending: VecDeque::new(),
            results: IndexMap::new(),
            skipped: Vec::new(),
        };

        for root in roots {
            if state.visited.insert(root.clone()) {
                state.pending.push_back(Discovered {
                    page_id: root.clone(),
                    origin: state.roots.len(),
                    depth: 0,
                });
                state.roots.push(root.clone());
            } else {
                log::debug!("Ignoring duplicate root {}", root);
            }
        }
        state
    }

    /// Removes and returns everything queued so far: one breadth-first level.
    pub fn take_level(&mut self) -> Vec<Discovered> {
        self.pending.drain(..).collect()
    }

    /// Queues `page_id` below `parent` unless it was seen before.
    pub fn discover(&mut self, page_id: PageId, parent: &Discovered) -> bool {
        if !self.visited.insert(page_id.clone()) {
            return false;
        }
        self.pending.push_back(Discovered {
            page_id,
            origin: parent.origin,
            depth: parent.depth + 1,
        });
        true
    }

    pub fn record(&mut self, page: Discovered, output: O) {
        self.results.insert(
            page.page_id.clone(),
            VisitedPage {
                page_id: page.page_id,
                origin: page.origin,
                depth: page.depth,
                output,
            },
        );
    }

    pub fn skip(&mut self, page: Discovered, reason: String) {
        self.skipped.push(SkippedPage {
            page_id: page.page_id,
            origin: page.origin,
            reason,
        });
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Final ordering: root by root, discovery order within each root.
    pub fn into_outcome(self) -> WalkOutcome<O> {
        let mut pages: Vec<VisitedPage<O>> = self.results.into_values().collect();
        pages.sort_by_key(|page| page.origin);
        WalkOutcome {
            roots: self.roots,
            pages,
            skipped: self.skipped,
        }
    }
}
