// src/model/tree.rs
use super::block::Block;
use crate::types::PageId;
use indexmap::IndexSet;

/// A page with its whole block tree merged in.
///
/// Built by the tree fetcher, read once by extraction and reference
/// scanning, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTree {
    pub page_id: PageId,
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}

impl PageTree {
    pub fn new(page_id: PageId, title: Option<String>, blocks: Vec<Block>) -> Self {
        Self {
            page_id,
            title,
            blocks,
        }
    }

    /// Pre-order traversal yielding `(depth, block)`, top-level blocks at depth 0.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter {
            stack: self.blocks.iter().rev().map(|b| (0, b)).collect(),
        }
    }

    /// True once every block's children have been merged in.
    pub fn is_complete(&self) -> bool {
        self.iter().all(|(_, block)| !block.pending_children)
    }

    pub fn block_count(&self) -> usize {
        self.iter().count()
    }

    /// Pages referenced from anywhere in the tree, in document order, each once.
    ///
    /// A self-reference is dropped.
    pub fn page_references(&self) -> Vec<PageId> {
        let refs: IndexSet<PageId> = self
            .iter()
            .filter_map(|(_, block)| block.page_reference())
            .filter(|id| id != &self.page_id)
            .collect();
        refs.into_iter().collect()
    }
}

/// Explicit-stack pre-order iterator over a page tree.
pub struct TreeIter<'a> {
    stack: Vec<(usize, &'a Block)>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = (usize, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, block) = self.stack.pop()?;
        self.stack
            .extend(block.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, block))
    }
}
