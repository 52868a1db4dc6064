// src/api/parser.rs
//! Turns raw API responses into domain values.
//!
//! Success bodies are decoded with serde into the shapes in `responses` and
//! converted into `Block`s; error bodies are classified into
//! `CrawlError::RequestRejected` with a typed `NotionErrorCode`.

use super::client::ApiResponse;
use super::responses::{
    NotionApiErrorResponse, PaginatedResponse, RawBlock, RawPage, RawRichText,
};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{CrawlError, NotionErrorCode};
use crate::model::{Block, BlockKind, ContainerKind, MediaKind, TextFragment};
use crate::types::{BlockId, PageId};
use serde_json::Value;

/// Decodes a successful response body.
pub fn parse_body<T>(response: &ApiResponse<String>) -> Result<T, CrawlError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(&response.data).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", response.url, e);
        CrawlError::MalformedResponse(format!(
            "{} (body: {})",
            e,
            preview(&response.data)
        ))
    })
}

/// Classifies a non-success response.
///
/// Uses the `code` from a Notion error body when there is one and falls back
/// to the HTTP status otherwise.
pub fn parse_rejection(endpoint: &str, response: &ApiResponse<String>) -> CrawlError {
    let status = response.status.as_u16();
    let (code, body) = match serde_json::from_str::<NotionApiErrorResponse>(&response.data) {
        Ok(error) => (NotionErrorCode::from_api_response(&error.code), error.message),
        Err(_) => (
            NotionErrorCode::from_http_status(status),
            preview(&response.data),
        ),
    };

    CrawlError::RequestRejected {
        endpoint: endpoint.to_string(),
        status,
        code,
        body,
    }
}

/// Extracts the title of a page object, if it has a non-empty one.
pub fn parse_page_title(response: &ApiResponse<String>) -> Result<Option<String>, CrawlError> {
    let page: RawPage = parse_body(response)?;
    let title = page
        .properties
        .values()
        .find(|property| property.property_type == "title")
        .map(|property| {
            property
                .title
                .iter()
                .map(|t| t.plain_text.as_str())
                .collect::<String>()
        })
        .filter(|title| !title.trim().is_empty());
    Ok(title)
}

/// Parses one page of a `blocks/{id}/children` listing.
pub fn parse_children_page(
    response: &ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, CrawlError> {
    let raw: PaginatedResponse<RawBlock> = parse_body(response)?;
    raw.try_map(convert_block)
}

/// Converts a raw block into the domain model.
pub fn convert_block(raw: RawBlock) -> Result<Block, CrawlError> {
    let id = BlockId::parse(&raw.id).map_err(|e| {
        CrawlError::MalformedResponse(format!("block id {:?}: {}", raw.id, e))
    })?;
    let content = raw.content().cloned().unwrap_or(Value::Null);
    let kind = classify(&raw.block_type, &content);
    let text = match &kind {
        BlockKind::TableRow { .. } | BlockKind::Equation { .. } => Vec::new(),
        _ => rich_text(content.get("rich_text")),
    };

    let mut block = Block::new(id, kind).with_text(text);
    block.has_children = raw.has_children;
    block.pending_children = block.needs_expansion();
    Ok(block)
}

fn classify(block_type: &str, content: &Value) -> BlockKind {
    match block_type {
        "paragraph" => BlockKind::Paragraph,
        "heading_1" => BlockKind::Heading { level: 1 },
        "heading_2" => BlockKind::Heading { level: 2 },
        "heading_3" => BlockKind::Heading { level: 3 },
        "bulleted_list_item" => BlockKind::BulletedListItem,
        "numbered_list_item" => BlockKind::NumberedListItem,
        "to_do" => BlockKind::ToDo {
            checked: content
                .get("checked")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        },
        "toggle" => BlockKind::Toggle,
        "quote" => BlockKind::Quote,
        "callout" => BlockKind::Callout,
        "code" => BlockKind::Code {
            language: string_field(content, "language").unwrap_or_default(),
        },
        "equation" => BlockKind::Equation {
            expression: string_field(content, "expression").unwrap_or_default(),
        },
        "divider" => BlockKind::Divider,
        "child_page" => BlockKind::ChildPage {
            title: string_field(content, "title").unwrap_or_default(),
        },
        "child_database" => BlockKind::ChildDatabase {
            title: string_field(content, "title").unwrap_or_default(),
        },
        "link_to_page" => BlockKind::LinkToPage {
            page_id: link_target(content),
        },
        "image" => media(MediaKind::Image, content),
        "video" => media(MediaKind::Video, content),
        "audio" => media(MediaKind::Audio, content),
        "file" => media(MediaKind::File, content),
        "pdf" => media(MediaKind::Pdf, content),
        "embed" => media(MediaKind::Embed, content),
        "bookmark" => media(MediaKind::Bookmark, content),
        "link_preview" => media(MediaKind::LinkPreview, content),
        "table_row" => BlockKind::TableRow {
            cells: content
                .get("cells")
                .and_then(Value::as_array)
                .map(|cells| cells.iter().map(|cell| rich_text(Some(cell))).collect())
                .unwrap_or_default(),
        },
        "column_list" => BlockKind::Container(ContainerKind::ColumnList),
        "column" => BlockKind::Container(ContainerKind::Column),
        "synced_block" => BlockKind::Container(ContainerKind::SyncedBlock),
        "table" => BlockKind::Container(ContainerKind::Table),
        "template" => BlockKind::Container(ContainerKind::Template),
        other => BlockKind::Unsupported {
            type_name: other.to_string(),
        },
    }
}

/// `link_to_page` targets either a page or a database; only pages count.
fn link_target(content: &Value) -> Option<PageId> {
    if content.get("type").and_then(Value::as_str) != Some("page_id") {
        return None;
    }
    let raw = string_field(content, "page_id")?;
    match PageId::parse(&raw) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Ignoring link_to_page with unreadable target {:?}: {}", raw, e);
            None
        }
    }
}

/// Media blocks keep their URL either inline or under `external`/`file`.
fn media(kind: MediaKind, content: &Value) -> BlockKind {
    let url = string_field(content, "url").or_else(|| {
        let source = content.get("type").and_then(Value::as_str)?;
        content.get(source).and_then(|s| string_field(s, "url"))
    });
    BlockKind::Media { kind, url }
}

fn rich_text(value: Option<&Value>) -> Vec<TextFragment> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value::<RawRichText>(item.clone()).ok())
        .map(|item| TextFragment {
            plain_text: item.plain_text,
            href: item.href,
        })
        .collect()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
