// src/formatting/text_extractor.rs
//! Converts a page's block tree into plain text.
//!
//! One line per text-bearing block in document order, parents before their
//! children, each nesting level indented with a tab. Extraction never fails:
//! blocks it cannot render are skipped.

use super::rich_text::render_fragments;
use crate::model::{Block, BlockKind, PageTree};

/// What the extractor emits besides block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Emit the page title as the first line.
    pub include_titles: bool,
    /// Emit `[image: <url>]`-style markers for blocks without text.
    pub include_non_text_placeholders: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_titles: true,
            include_non_text_placeholders: false,
        }
    }
}

/// Pure block-tree-to-text conversion.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    options: ExtractOptions,
}

impl TextExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    pub fn extract(&self, tree: &PageTree) -> String {
        let mut lines = Vec::new();

        if self.options.include_titles {
            if let Some(title) = tree.title.as_deref().filter(|t| !t.trim().is_empty()) {
                lines.push(title.to_string());
            }
        }

        self.render_siblings(&tree.blocks, 0, &mut lines);
        lines.join("\n")
    }

    fn render_siblings(&self, blocks: &[Block], depth: usize, lines: &mut Vec<String>) {
        let mut number = 0usize;

        for block in blocks {
            number = match block.kind {
                BlockKind::NumberedListItem => number + 1,
                _ => 0,
            };

            if let Some(rendered) = self.render_block(block, number) {
                push_indented(lines, &rendered, depth);
            }

            // Containers only group blocks; their children stay at the same level.
            let child_depth = match block.kind {
                BlockKind::Container(_) | BlockKind::Unsupported { .. } => depth,
                _ => depth + 1,
            };
            self.render_siblings(&block.children, child_depth, lines);
        }
    }

    /// Renders one block, possibly over several lines, without indentation.
    fn render_block(&self, block: &Block, number: usize) -> Option<String> {
        let text = render_fragments(&block.text);

        let rendered = match &block.kind {
            BlockKind::Paragraph | BlockKind::Toggle | BlockKind::Callout => text,
            BlockKind::Heading { level } => {
                format!("{} {}", "#".repeat(usize::from(*level).clamp(1, 3)), text)
            }
            BlockKind::BulletedListItem => format!("* {}", text),
            BlockKind::NumberedListItem => format!("{}. {}", number, text),
            BlockKind::ToDo { checked } => {
                format!("[{}] {}", if *checked { "x" } else { " " }, text)
            }
            BlockKind::Quote => format!("> {}", text),
            BlockKind::Code { language } => format!("```{}\n{}\n```", language, text),
            BlockKind::Equation { expression } => expression.clone(),
            BlockKind::Divider => "---".to_string(),
            BlockKind::TableRow { cells } => cells
                .iter()
                .map(|cell| render_fragments(cell))
                .collect::<Vec<_>>()
                .join(" | "),
            BlockKind::ChildPage { title } => return self.placeholder("child page", title),
            BlockKind::ChildDatabase { title } => {
                return self.placeholder("child database", title)
            }
            BlockKind::LinkToPage { page_id } => {
                let target = page_id.as_ref().map(|id| id.to_string()).unwrap_or_default();
                return self.placeholder("link to page", &target);
            }
            BlockKind::Media { kind, url } => {
                return self.placeholder(kind.label(), url.as_deref().unwrap_or_default())
            }
            BlockKind::Container(_) | BlockKind::Unsupported { .. } => return None,
        };

        if rendered.trim().is_empty() {
            None
        } else {
            Some(rendered)
        }
    }

    fn placeholder(&self, label: &str, detail: &str) -> Option<String> {
        if !self.options.include_non_text_placeholders {
            return None;
        }
        if detail.is_empty() {
            Some(format!("[{}]", label))
        } else {
            Some(format!("[{}: {}]", label, detail))
        }
    }
}

fn push_indented(lines: &mut Vec<String>, rendered: &str, depth: usize) {
    let indent = "\t".repeat(depth);
    for line in rendered.split('\n') {
        lines.push(format!("{}{}", indent, line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerKind, MediaKind, TextFragment};
    use crate::types::{BlockId, PageId};
    use pretty_assertions::assert_eq;

    fn bid(n: u32) -> BlockId {
        BlockId::parse(&format!("{:032x}", n)).unwrap()
    }

    fn block(n: u32, kind: BlockKind, text: &str) -> Block {
        Block::new(bid(n), kind).with_text(vec![TextFragment::plain(text)])
    }

    fn tree(title: Option<&str>, blocks: Vec<Block>) -> PageTree {
        PageTree::new(
            PageId::parse(&format!("{:032x}", 999)).unwrap(),
            title.map(str::to_string),
            blocks,
        )
    }

    fn sample() -> PageTree {
        tree(
            Some("Weekly notes"),
            vec![
                block(1, BlockKind::Heading { level: 2 }, "Agenda"),
                block(2, BlockKind::NumberedListItem, "first"),
                block(3, BlockKind::NumberedListItem, "second")
                    .with_children(vec![block(4, BlockKind::BulletedListItem, "detail")]),
                block(5, BlockKind::Paragraph, "break"),
                block(6, BlockKind::NumberedListItem, "restart"),
                block(7, BlockKind::ToDo { checked: true }, "done"),
                block(8, BlockKind::ToDo { checked: false }, "open"),
                block(9, BlockKind::Quote, "quoted"),
                Block::new(
                    bid(10),
                    BlockKind::Media {
                        kind: MediaKind::Image,
                        url: Some("https://img.example/a.png".to_string()),
                    },
                ),
                Block::new(
                    bid(11),
                    BlockKind::ChildPage {
                        title: "Sub".to_string(),
                    },
                ),
            ],
        )
    }

    #[test]
    fn test_document_layout() {
        let text = TextExtractor::default().extract(&sample());
        assert_eq!(
            text,
            "Weekly notes\n## Agenda\n1. first\n2. second\n\t* detail\nbreak\n1. restart\n[x] done\n[ ] open\n> quoted"
        );
    }

    #[test]
    fn test_placeholders_when_enabled() {
        let extractor = TextExtractor::new(ExtractOptions {
            include_titles: false,
            include_non_text_placeholders: true,
        });
        let text = extractor.extract(&sample());
        assert!(text.starts_with("## Agenda"));
        assert!(text.ends_with("[image: https://img.example/a.png]\n[child page: Sub]"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = TextExtractor::default();
        let first = extractor.extract(&sample());
        let second = extractor.extract(&sample().clone());
        assert_eq!(first, second);
    }

    #[test]
    fn test_code_and_tables() {
        let code = block(
            1,
            BlockKind::Code {
                language: "rust".to_string(),
            },
            "fn main() {}",
        );
        let row = Block::new(
            bid(3),
            BlockKind::TableRow {
                cells: vec![
                    vec![TextFragment::plain("a")],
                    vec![TextFragment::linked("b", "https://b.example")],
                ],
            },
        );
        let table = Block::new(bid(2), BlockKind::Container(ContainerKind::Table))
            .with_children(vec![row]);

        let text = TextExtractor::default().extract(&tree(None, vec![code, table]));
        assert_eq!(text, "```rust\nfn main() {}\n```\na | [b](https://b.example)");
    }

    #[test]
    fn test_nested_code_is_indented_per_line() {
        let code = block(
            2,
            BlockKind::Code {
                language: String::new(),
            },
            "x",
        );
        let parent = block(1, BlockKind::Toggle, "show").with_children(vec![code]);
        let text = TextExtractor::default().extract(&tree(None, vec![parent]));
        assert_eq!(text, "show\n\t```\n\tx\n\t```");
    }

    #[test]
    fn test_unknown_and_empty_blocks_emit_nothing() {
        let blocks = vec![
            Block::new(
                bid(1),
                BlockKind::Unsupported {
                    type_name: "ai_block".to_string(),
                },
            ),
            Block::new(bid(2), BlockKind::Paragraph),
            block(3, BlockKind::Paragraph, "kept"),
        ];
        let extractor = TextExtractor::new(ExtractOptions {
            include_titles: true,
            include_non_text_placeholders: true,
        });
        assert_eq!(extractor.extract(&tree(Some("  "), blocks)), "kept");
    }

    #[test]
    fn test_empty_tree_is_empty_string() {
        assert_eq!(TextExtractor::default().extract(&tree(None, vec![])), "");
    }
}
