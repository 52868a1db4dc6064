// src/formatting/mod.rs
//! Renders page trees into plain text.

mod rich_text;
pub mod text_extractor;

pub use rich_text::render_fragments;
pub use text_extractor::{ExtractOptions, TextExtractor};
