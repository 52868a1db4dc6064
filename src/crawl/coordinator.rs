// src/crawl/coordinator.rs
//! Runs a whole crawl: walk the page graph, extract every page, collect texts.

use super::state::SkippedPage;
use super::walker::{PageGraphWalker, PageVisitor};
use crate::api::BlockTreeFetcher;
use crate::error::CrawlError;
use crate::formatting::TextExtractor;
use crate::model::PageTree;
use crate::types::PageId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

impl PageVisitor for TextExtractor {
    type Output = String;

    fn visit(&self, tree: &PageTree) -> String {
        self.extract(tree)
    }
}

/// Extracted text of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    pub page_id: PageId,
    /// The root this page was reached from.
    pub root: PageId,
    pub text: String,
}

/// Everything a crawl produced.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Root order, each root first, then its descendants in discovery order.
    pub documents: Vec<PageDocument>,
    pub skipped: Vec<SkippedPage>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn texts(&self) -> Vec<String> {
        self.documents.iter().map(|doc| doc.text.clone()).collect()
    }

    pub fn into_texts(self) -> Vec<String> {
        self.documents.into_iter().map(|doc| doc.text).collect()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Concurrent crawl of several roots with text extraction.
pub struct CrawlCoordinator {
    walker: PageGraphWalker,
    extractor: Arc<TextExtractor>,
}

impl CrawlCoordinator {
    pub fn new(fetcher: Arc<BlockTreeFetcher>, concurrency: usize, extractor: TextExtractor) -> Self {
        Self {
            walker: PageGraphWalker::new(fetcher, concurrency),
            extractor: Arc::new(extractor),
        }
    }

    /// Crawls every page reachable from `roots`.
    ///
    /// Fails with `CrawlAborted` on the first error other than a denied
    /// non-root page; nothing is returned for the pages already done.
    pub async fn crawl(&self, roots: &[PageId]) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        log::info!(
            "Crawling {} root page(s) with {} workers",
            roots.len(),
            self.walker.concurrency()
        );

        let outcome = self.walker.walk(roots, self.extractor.clone()).await?;

        let documents: Vec<PageDocument> = outcome
            .pages
            .into_iter()
            .map(|page| PageDocument {
                root: outcome.roots[page.origin].clone(),
                page_id: page.page_id,
                text: page.output,
            })
            .collect();

        let report = CrawlReport {
            documents,
            skipped: outcome.skipped,
            started_at,
            finished_at: Utc::now(),
        };

        log::info!(
            "Crawl finished: {} documents, {} skipped, {} ms",
            report.documents.len(),
            report.skipped.len(),
            report.duration().num_milliseconds()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{
        child_page, id, link_to_page, page_endpoint, paragraph, toggle, FakeWorkspace,
    };
    use crate::api::{RateLimit, RateLimitedClient, RetryPolicy};
    use crate::formatting::ExtractOptions;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn coordinator(workspace: Arc<FakeWorkspace>, concurrency: usize) -> CrawlCoordinator {
        let client = RateLimitedClient::new(
            workspace,
            RateLimit {
                capacity: 1000,
                refill_per_second: 1000.0,
            },
            RetryPolicy::default(),
        );
        let fetcher = BlockTreeFetcher::new(Arc::new(client), 50);
        CrawlCoordinator::new(Arc::new(fetcher), concurrency, TextExtractor::default())
    }

    fn pid(n: u32) -> PageId {
        PageId::parse(&id(n)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_follows_root_order_not_completion_order() {
        let workspace = Arc::new(
            FakeWorkspace::new()
                .page(1, "Slow root", vec![child_page(3, "Slow child")])
                .page(2, "Fast root", vec![paragraph(20, "quick")])
                .page(3, "Slow child", vec![paragraph(30, "late")])
                .delay(1, Duration::from_secs(5))
                .delay(3, Duration::from_secs(5)),
        );
        let report = coordinator(workspace, 5)
            .crawl(&[pid(1), pid(2)])
            .await
            .unwrap();

        assert_eq!(
            report.texts(),
            vec![
                "Slow root".to_string(),
                "Slow child\nlate".to_string(),
                "Fast root\nquick".to_string(),
            ]
        );
        assert_eq!(report.documents[1].root, pid(1));
    }

    #[tokio::test]
    async fn test_shared_page_goes_to_first_root() {
        let workspace = Arc::new(
            FakeWorkspace::new()
                .page(1, "One", vec![link_to_page(10, 9)])
                .page(2, "Two", vec![link_to_page(20, 9)])
                .page(9, "Shared", vec![]),
        );
        let report = coordinator(workspace.clone(), 3)
            .crawl(&[pid(1), pid(2)])
            .await
            .unwrap();

        let order: Vec<(PageId, PageId)> = report
            .documents
            .iter()
            .map(|doc| (doc.page_id.clone(), doc.root.clone()))
            .collect();
        assert_eq!(
            order,
            vec![(pid(1), pid(1)), (pid(9), pid(1)), (pid(2), pid(2))]
        );
        assert_eq!(workspace.request_count(&page_endpoint(9)), 1);
    }

    #[tokio::test]
    async fn test_root_reachable_from_earlier_root_keeps_its_place() {
        let workspace = Arc::new(
            FakeWorkspace::new()
                .page(1, "One", vec![child_page(2, "Two")])
                .page(2, "Two", vec![paragraph(20, "body")]),
        );
        let report = coordinator(workspace.clone(), 2)
            .crawl(&[pid(1), pid(2), pid(1)])
            .await
            .unwrap();

        assert_eq!(
            report.texts(),
            vec!["One".to_string(), "Two\nbody".to_string()]
        );
        assert_eq!(report.documents[1].root, pid(2));
        assert_eq!(workspace.request_count(&page_endpoint(1)), 1);
    }

    #[tokio::test]
    async fn test_denied_child_is_reported_as_skipped() {
        let workspace = Arc::new(
            FakeWorkspace::new()
                .page(1, "Root", vec![child_page(2, "Private")])
                .deny(2),
        );
        let report = coordinator(workspace, 2).crawl(&[pid(1)]).await.unwrap();

        assert_eq!(report.texts(), vec!["Root".to_string()]);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_fatal_error_aborts_without_partial_output() {
        let workspace = Arc::new(
            FakeWorkspace::new()
                .page(1, "Root", vec![child_page(2, "Broken")])
                .with_status(2, 400),
        );
        let err = coordinator(workspace, 2)
            .crawl(&[pid(1)])
            .await
            .unwrap_err();

        match err {
            CrawlError::CrawlAborted { page_id, source } => {
                assert_eq!(page_id, pid(2));
                assert!(matches!(
                    *source,
                    CrawlError::RequestRejected { status: 400, .. }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_stops_every_worker_request() {
        let sections = (0..20).map(|n| toggle(100 + n, "section")).collect();
        let workspace = Arc::new((0..20).fold(
            FakeWorkspace::new()
                .page(1, "Broken", vec![])
                .with_status(1, 400)
                .page(2, "Large", sections),
            |workspace, n| workspace.children(100 + n, vec![paragraph(200 + n, "body")]),
        ));
        let client = RateLimitedClient::new(
            workspace.clone(),
            RateLimit {
                capacity: 1,
                refill_per_second: 1.0,
            },
            RetryPolicy::default(),
        );
        let fetcher = Arc::new(BlockTreeFetcher::new(Arc::new(client), 50));
        let coordinator = CrawlCoordinator::new(fetcher, 5, TextExtractor::default());

        let err = coordinator.crawl(&[pid(1), pid(2)]).await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            CrawlError::RequestRejected { status: 400, .. }
        ));

        let at_abort = workspace.requests().len();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(workspace.requests().len(), at_abort);
        assert!(at_abort < 5, "{} requests before the abort", at_abort);
    }

    #[tokio::test(start_paused = true)]
    async fn test_placeholders_reach_the_output() {
        let workspace = Arc::new(
            FakeWorkspace::new()
                .page(1, "Root", vec![child_page(2, "Sub")])
                .page(2, "Sub", vec![]),
        );
        let client = RateLimitedClient::new(workspace, RateLimit::default(), RetryPolicy::default());
        let fetcher = Arc::new(BlockTreeFetcher::new(Arc::new(client), 50));
        let coordinator = CrawlCoordinator::new(
            fetcher,
            1,
            TextExtractor::new(ExtractOptions {
                include_titles: true,
                include_non_text_placeholders: true,
            }),
        );

        let texts = coordinator.crawl(&[pid(1)]).await.unwrap().into_texts();
        assert_eq!(
            texts,
            vec!["Root\n[child page: Sub]".to_string(), "Sub".to_string()]
        );
    }
}
