// src/api/tree_fetcher.rs
//! Fetches one page's complete block tree.

use super::client::{ApiRequest, ApiResponse};
use super::pagination::fetch_all_pages;
use super::parser::{parse_children_page, parse_page_title};
use super::rate_limit::RateLimitedClient;
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::CrawlError;
use crate::model::{Block, PageTree};
use crate::types::{BlockId, PageId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A block in the expansion arena with the arena indices of its children.
struct Node {
    block: Block,
    children: Vec<usize>,
}

/// Builds `PageTree`s by listing children level after level.
pub struct BlockTreeFetcher {
    client: Arc<RateLimitedClient>,
    max_depth: usize,
}

impl BlockTreeFetcher {
    pub fn new(client: Arc<RateLimitedClient>, max_depth: usize) -> Self {
        Self { client, max_depth }
    }

    /// Fetches the page title and every block below the page.
    ///
    /// 404 and 403 on the page itself surface as `PageNotFound` and
    /// `PermissionDenied`.
    pub async fn fetch_tree(&self, page_id: &PageId) -> Result<PageTree, CrawlError> {
        self.fetch_tree_until(page_id, &AtomicBool::new(false)).await
    }

    /// `fetch_tree` that stops with `Cancelled` before its next request once
    /// `cancelled` is set.
    pub async fn fetch_tree_until(
        &self,
        page_id: &PageId,
        cancelled: &AtomicBool,
    ) -> Result<PageTree, CrawlError> {
        let title = self
            .fetch_title(page_id, cancelled)
            .await
            .map_err(|e| e.for_page(page_id))?;
        let top_level = self
            .fetch_children(&page_id.cast(), cancelled)
            .await
            .map_err(|e| e.for_page(page_id))?;

        let blocks = self.expand(page_id, top_level, cancelled).await?;
        let tree = PageTree::new(page_id.clone(), title, blocks);
        debug_assert!(tree.is_complete());

        log::debug!(
            "Fetched block tree of {} ({} blocks)",
            page_id,
            tree.block_count()
        );
        Ok(tree)
    }

    async fn send(
        &self,
        request: &ApiRequest,
        cancelled: &AtomicBool,
    ) -> Result<ApiResponse<String>, CrawlError> {
        if cancelled.load(Ordering::Acquire) {
            return Err(CrawlError::Cancelled {
                endpoint: request.to_string(),
            });
        }
        self.client.send(request).await
    }

    async fn fetch_title(
        &self,
        page_id: &PageId,
        cancelled: &AtomicBool,
    ) -> Result<Option<String>, CrawlError> {
        let request = ApiRequest::new(format!("pages/{}", page_id.to_hyphenated()));
        let response = self.send(&request, cancelled).await?;
        parse_page_title(&response)
    }

    /// Lists all children of a block, following continuation cursors.
    async fn fetch_children(
        &self,
        parent: &BlockId,
        cancelled: &AtomicBool,
    ) -> Result<Vec<Block>, CrawlError> {
        let endpoint = format!("blocks/{}/children", parent.to_hyphenated());

        let result = fetch_all_pages(|cursor| {
            let mut request = ApiRequest::new(endpoint.clone())
                .with_query("page_size", NOTION_API_PAGE_SIZE.to_string());
            if let Some(cursor) = cursor {
                request = request.with_query("start_cursor", cursor);
            }
            async move {
                let response = self.send(&request, cancelled).await?;
                parse_children_page(&response)
            }
        })
        .await?;

        if result.pages_fetched > 1 {
            log::debug!(
                "Merged {} continuation pages for block {}",
                result.pages_fetched,
                parent
            );
        }
        Ok(result.items)
    }

    /// Expands nested children with an explicit work stack over an arena.
    ///
    /// Top-level blocks sit at depth 1. Listing the children of a block at
    /// depth `max_depth` fails with `MaxDepthExceeded`.
    async fn expand(
        &self,
        page_id: &PageId,
        top_level: Vec<Block>,
        cancelled: &AtomicBool,
    ) -> Result<Vec<Block>, CrawlError> {
        let mut arena: Vec<Node> = Vec::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();

        let roots: Vec<usize> = top_level
            .into_iter()
            .map(|block| push_node(&mut arena, &mut stack, block, 1))
            .collect();

        while let Some((index, depth)) = stack.pop() {
            if depth >= self.max_depth {
                return Err(CrawlError::MaxDepthExceeded {
                    page_id: page_id.clone(),
                    max_depth: self.max_depth,
                });
            }

            let parent = arena[index].block.id.clone();
            let children = self.fetch_children(&parent, cancelled).await?;
            for child in children {
                let child_index = push_node(&mut arena, &mut stack, child, depth + 1);
                arena[index].children.push(child_index);
            }
            arena[index].block.pending_children = false;
        }

        Ok(assemble(arena, &roots))
    }
}

fn push_node(
    arena: &mut Vec<Node>,
    stack: &mut Vec<(usize, usize)>,
    block: Block,
    depth: usize,
) -> usize {
    let index = arena.len();
    if block.needs_expansion() {
        stack.push((index, depth));
    }
    arena.push(Node {
        block,
        children: Vec::new(),
    });
    index
}

/// Moves arena nodes into their parents.
///
/// Children always have larger indices than their parent, so walking the
/// arena backwards finishes every child before its parent is assembled.
fn assemble(arena: Vec<Node>, roots: &[usize]) -> Vec<Block> {
    let (mut slots, links): (Vec<Option<Block>>, Vec<Vec<usize>>) = arena
        .into_iter()
        .map(|node| (Some(node.block), node.children))
        .unzip();

    for index in (0..slots.len()).rev() {
        if links[index].is_empty() {
            continue;
        }
        let children: Vec<Block> = links[index]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(block) = slots[index].as_mut() {
            block.children = children;
        }
    }

    roots.iter().filter_map(|&root| slots[root].take()).collect()
}
