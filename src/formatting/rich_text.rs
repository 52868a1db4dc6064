// src/formatting/rich_text.rs
//! Flattens rich text fragments into a single line of text.

use crate::model::TextFragment;
use std::borrow::Cow;

/// Concatenates fragments; linked fragments render as `[text](href)`.
pub fn render_fragments(fragments: &[TextFragment]) -> String {
    fragments.iter().map(render_fragment).collect()
}

fn render_fragment(fragment: &TextFragment) -> Cow<'_, str> {
    match &fragment.href {
        Some(href) if !fragment.plain_text.is_empty() => {
            Cow::Owned(format!("[{}]({})", fragment.plain_text, href))
        }
        _ => Cow::Borrowed(fragment.plain_text.as_str()),
    }
}
