// src/crawl/walker.rs
//! Breadth-first expansion of root pages into every reachable page.
//!
//! The dispatch loop hands a whole level to a pool of worker tasks, waits for
//! every result, then updates the crawl state in sequence order. Completion
//! order therefore never leaks into the output.

use super::state::{CrawlState, Discovered, WalkOutcome};
use crate::api::BlockTreeFetcher;
use crate::constants::MAX_CONCURRENCY;
use crate::error::CrawlError;
use crate::model::PageTree;
use crate::types::PageId;
use indexmap::IndexSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

/// Work done on each fetched page inside a worker.
///
/// The tree is dropped right after `visit` returns, so whatever the crawl
/// needs from a page must come out of here.
pub trait PageVisitor: Send + Sync + 'static {
    type Output: Send + 'static;

    fn visit(&self, tree: &PageTree) -> Self::Output;
}

/// Visitor for plain discovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVisitor;

impl PageVisitor for NoopVisitor {
    type Output = ();

    fn visit(&self, _tree: &PageTree) {}
}

/// Expands root ids into the set of reachable pages.
pub struct PageGraphWalker {
    fetcher: Arc<BlockTreeFetcher>,
    concurrency: usize,
}

impl PageGraphWalker {
    /// `concurrency` is clamped to `1..=MAX_CONCURRENCY`.
    pub fn new(fetcher: Arc<BlockTreeFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Every page reachable from `roots` that could be fetched, in
    /// discovery order.
    pub async fn discover(&self, roots: &[PageId]) -> Result<IndexSet<PageId>, CrawlError> {
        let outcome = self.walk(roots, Arc::new(NoopVisitor)).await?;
        Ok(outcome.pages.into_iter().map(|page| page.page_id).collect())
    }

    /// Fetches every reachable page once and runs `visitor` on it.
    ///
    /// A `PermissionDenied` below a root is recorded as a skip. Any other
    /// failure cancels the pool and returns `CrawlAborted`.
    pub async fn walk<V: PageVisitor>(
        &self,
        roots: &[PageId],
        visitor: Arc<V>,
    ) -> Result<WalkOutcome<V::Output>, CrawlError> {
        let mut state = CrawlState::with_roots(roots);
        if !state.has_pending() {
            return Ok(state.into_outcome());
        }

        let mut pool = WorkerPool::spawn(self.concurrency, self.fetcher.clone(), visitor);
        let mut level_number = 0;

        loop {
            let level = state.take_level();
            if level.is_empty() {
                break;
            }
            log::debug!("Dispatching level {} ({} pages)", level_number, level.len());

            let outcomes = match pool.run_level(&level).await {
                Ok(outcomes) => outcomes,
                Err(err) => {
                    pool.cancel();
                    return Err(err);
                }
            };

            for (page, outcome) in level.into_iter().zip(outcomes) {
                match outcome {
                    Ok(visit) => {
                        for reference in visit.references {
                            state.discover(reference, &page);
                        }
                        state.record(page, visit.output);
                    }
                    Err(err) => {
                        log::warn!("Skipping page {}: {}", page.page_id, err);
                        state.skip(page, err.to_string());
                    }
                }
            }
            level_number += 1;
        }

        pool.shutdown().await;
        log::info!(
            "Page graph walk finished: {} pages visited",
            state.visited_count()
        );
        Ok(state.into_outcome())
    }
}

struct Job {
    seq: usize,
    page_id: PageId,
}

struct Visit<O> {
    output: O,
    references: Vec<PageId>,
}

struct JobResult<O> {
    seq: usize,
    outcome: Result<Visit<O>, CrawlError>,
}

/// Long-lived workers pulling from one shared job queue.
struct WorkerPool<O> {
    jobs: UnboundedSender<Job>,
    results: UnboundedReceiver<JobResult<O>>,
    cancelled: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl<O: Send + 'static> WorkerPool<O> {
    fn spawn<V>(size: usize, fetcher: Arc<BlockTreeFetcher>, visitor: Arc<V>) -> Self
    where
        V: PageVisitor<Output = O>,
    {
        let (job_tx, job_rx) = unbounded_channel();
        let (result_tx, result_rx) = unbounded_channel();
        let job_rx = Arc::new(AsyncMutex::new(job_rx));
        let cancelled = Arc::new(AtomicBool::new(false));

        let workers = (0..size)
            .map(|_| {
                tokio::spawn(worker_loop(
                    fetcher.clone(),
                    visitor.clone(),
                    job_rx.clone(),
                    result_tx.clone(),
                    cancelled.clone(),
                ))
            })
            .collect();

        Self {
            jobs: job_tx,
            results: result_rx,
            cancelled,
            workers,
        }
    }

    /// Runs one level and returns its outcomes in `level` order.
    ///
    /// Only soft-skippable failures come back inside the vector; the first
    /// fatal one is returned as `CrawlAborted` immediately.
    async fn run_level(
        &mut self,
        level: &[Discovered],
    ) -> Result<Vec<Result<Visit<O>, CrawlError>>, CrawlError> {
        for (seq, page) in level.iter().enumerate() {
            self.jobs
                .send(Job {
                    seq,
                    page_id: page.page_id.clone(),
                })
                .map_err(|_| CrawlError::InternalError {
                    message: "worker pool closed before dispatch finished".to_string(),
                })?;
        }

        let mut slots: Vec<Option<Result<Visit<O>, CrawlError>>> =
            (0..level.len()).map(|_| None).collect();

        for _ in 0..level.len() {
            let result = self
                .results
                .recv()
                .await
                .ok_or_else(|| CrawlError::InternalError {
                    message: "all workers stopped before the level finished".to_string(),
                })?;
            let page = &level[result.seq];

            let outcome = match result.outcome {
                Err(err) if err.is_permission_denied() && !page.is_root() => Err(err),
                Err(err) => return Err(CrawlError::aborted(page.page_id.clone(), err)),
                Ok(visit) => Ok(visit),
            };
            slots[result.seq] = Some(outcome);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Stops the pool. No worker sends another request: the flag stops
    /// fetches between requests and the abort drops whatever is in flight.
    fn cancel(self) {
        self.cancelled.store(true, Ordering::Release);
        for worker in &self.workers {
            worker.abort();
        }
        log::debug!("Cancelled worker pool of {} workers", self.workers.len());
    }

    async fn shutdown(self) {
        drop(self.jobs);
        for joined in futures::future::join_all(self.workers).await {
            if let Err(err) = joined {
                log::error!("Crawl worker failed: {}", err);
            }
        }
    }
}

async fn worker_loop<V: PageVisitor>(
    fetcher: Arc<BlockTreeFetcher>,
    visitor: Arc<V>,
    jobs: Arc<AsyncMutex<UnboundedReceiver<Job>>>,
    results: UnboundedSender<JobResult<V::Output>>,
    cancelled: Arc<AtomicBool>,
) {
    loop {
        let next = { jobs.lock().await.recv().await };
        let Some(job) = next else { break };
        if cancelled.load(Ordering::Acquire) {
            break;
        }

        let outcome = fetcher
            .fetch_tree_until(&job.page_id, &cancelled)
            .await
            .map(|tree| {
                log::info!(
                    "Fetched page {} ({} blocks)",
                    job.page_id,
                    tree.block_count()
                );
                Visit {
                    references: tree.page_references(),
                    output: visitor.visit(&tree),
                }
            });

        if results
            .send(JobResult {
                seq: job.seq,
                outcome,
            })
            .is_err()
        {
            break;
        }
    }
}
