// src/model/block.rs
use crate::types::{BlockId, PageId};

/// One styled span of text inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub plain_text: String,
    pub href: Option<String>,
}

impl TextFragment {
    /// Create an unlinked fragment.
    pub fn plain(text: &str) -> Self {
        Self {
            plain_text: text.to_string(),
            href: None,
        }
    }

    /// Create a fragment that links somewhere.
    pub fn linked(text: &str, href: &str) -> Self {
        Self {
            plain_text: text.to_string(),
            href: Some(href.to_string()),
        }
    }
}

/// Blocks whose content is a file or an external resource rather than text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    File,
    Pdf,
    Embed,
    Bookmark,
    LinkPreview,
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::File => "file",
            MediaKind::Pdf => "pdf",
            MediaKind::Embed => "embed",
            MediaKind::Bookmark => "bookmark",
            MediaKind::LinkPreview => "link_preview",
        }
    }
}

/// Blocks that only exist to hold other blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    ColumnList,
    Column,
    SyncedBlock,
    Table,
    Template,
}

impl ContainerKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContainerKind::ColumnList => "column_list",
            ContainerKind::Column => "column",
            ContainerKind::SyncedBlock => "synced_block",
            ContainerKind::Table => "table",
            ContainerKind::Template => "template",
        }
    }
}

/// The fixed set of block types the scraper understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    BulletedListItem,
    NumberedListItem,
    ToDo { checked: bool },
    Toggle,
    Quote,
    Callout,
    Code { language: String },
    Equation { expression: String },
    Divider,
    /// A sub-page living under this page. The block ID is the page ID.
    ChildPage { title: String },
    /// A link to another page; `page_id` is `None` when the link targets a
    /// database or a comment.
    LinkToPage { page_id: Option<PageId> },
    ChildDatabase { title: String },
    Media { kind: MediaKind, url: Option<String> },
    TableRow { cells: Vec<Vec<TextFragment>> },
    Container(ContainerKind),
    /// A block type this scraper does not know. Kept so the tree stays
    /// complete; extraction emits nothing for it.
    Unsupported { type_name: String },
}

impl BlockKind {
    /// Get block type name as the API spells it
    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading { level: 1 } => "heading_1",
            BlockKind::Heading { level: 2 } => "heading_2",
            BlockKind::Heading { .. } => "heading_3",
            BlockKind::BulletedListItem => "bulleted_list_item",
            BlockKind::NumberedListItem => "numbered_list_item",
            BlockKind::ToDo { .. } => "to_do",
            BlockKind::Toggle => "toggle",
            BlockKind::Quote => "quote",
            BlockKind::Callout => "callout",
            BlockKind::Code { .. } => "code",
            BlockKind::Equation { .. } => "equation",
            BlockKind::Divider => "divider",
            BlockKind::ChildPage { .. } => "child_page",
            BlockKind::LinkToPage { .. } => "link_to_page",
            BlockKind::ChildDatabase { .. } => "child_database",
            BlockKind::Media { kind, .. } => kind.label(),
            BlockKind::TableRow { .. } => "table_row",
            BlockKind::Container(kind) => kind.label(),
            BlockKind::Unsupported { type_name } => type_name,
        }
    }

    /// Whether the children of this block belong to the same document.
    ///
    /// Child pages and child databases have children too, but those are
    /// separate documents and are reached through the page graph instead.
    pub fn is_expandable(&self) -> bool {
        !matches!(
            self,
            BlockKind::ChildPage { .. } | BlockKind::ChildDatabase { .. }
        )
    }
}

/// A node in a page's content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub text: Vec<TextFragment>,
    pub has_children: bool,
    pub children: Vec<Block>,
    /// Children exist on the server but have not been merged in yet.
    pub pending_children: bool,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            text: Vec::new(),
            has_children: false,
            children: Vec::new(),
            pending_children: false,
        }
    }

    pub fn with_text(mut self, text: Vec<TextFragment>) -> Self {
        self.text = text;
        self
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self.pending_children = false;
        self
    }

    /// Whether the fetcher still has to list this block's children.
    pub fn needs_expansion(&self) -> bool {
        self.has_children && self.kind.is_expandable()
    }

    /// The page this block points at, if it is a page reference.
    pub fn page_reference(&self) -> Option<PageId> {
        match &self.kind {
            BlockKind::ChildPage { .. } => Some(self.id.cast()),
            BlockKind::LinkToPage { page_id } => page_id.clone(),
            _ => None,
        }
    }

    /// Concatenated plain text of the block's fragments.
    pub fn plain_text(&self) -> String {
        self.text.iter().map(|f| f.plain_text.as_str()).collect()
    }
}
