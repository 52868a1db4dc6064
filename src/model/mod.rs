// src/model/mod.rs
//! Domain model: blocks and the page trees they form.

mod block;
mod tree;

pub use block::{Block, BlockKind, ContainerKind, MediaKind, TextFragment};
pub use tree::{PageTree, TreeIter};
