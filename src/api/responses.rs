// src/api/responses.rs
//! Wire shapes of the Notion API responses the scraper reads.
//!
//! Only the fields the crawler needs are declared; everything else in the
//! payload is ignored by serde.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generic paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Converts the results while keeping the continuation fields.
    pub fn try_map<U, E>(
        self,
        f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<PaginatedResponse<U>, E> {
        let results = self.results.into_iter().map(f).collect::<Result<_, E>>()?;
        Ok(PaginatedResponse {
            object: self.object,
            results,
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        })
    }
}

/// A block as returned by `blocks/{id}/children`.
///
/// The type-specific payload sits under a key named after the type, so it is
/// kept as raw JSON and picked apart by the parser.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl RawBlock {
    /// The object stored under the block's own type key.
    pub fn content(&self) -> Option<&Value> {
        self.payload.get(&self.block_type)
    }
}

/// One rich text item. Annotations are irrelevant to plain text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRichText {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// A page object from `pages/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPage {
    pub id: String,
    #[serde(default)]
    pub properties: IndexMap<String, RawProperty>,
}

/// A page property; only the title kind carries text we want.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProperty {
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub title: Vec<RawRichText>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionApiErrorResponse {
    #[serde(default)]
    pub object: String,
    pub status: u16,
    pub code: String,
    #[serde(default)]
    pub message: String,
}
