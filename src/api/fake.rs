// src/api/fake.rs
//! In-memory Notion workspace used by unit tests.
//!
//! Serves `pages/{id}` and paginated `blocks/{id}/children` the way the real
//! API does, with per-page delays, forced error statuses and scripted
//! responses that are played back before normal serving.

use super::client::{ApiRequest, ApiResponse, TransportFailure};
use super::NotionTransport;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 32-hex id for test object `n`.
pub(crate) fn id(n: u32) -> String {
    format!("{:032x}", n)
}

/// Dashed form of `id(n)`, as it appears in endpoints.
pub(crate) fn dashed(n: u32) -> String {
    let raw = id(n);
    format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..32]
    )
}

pub(crate) fn page_endpoint(n: u32) -> String {
    format!("pages/{}", dashed(n))
}

pub(crate) fn children_endpoint(n: u32) -> String {
    format!("blocks/{}/children", dashed(n))
}

fn text_block(n: u32, block_type: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "id": dashed(n),
        "type": block_type,
        block_type: { "rich_text": [{ "plain_text": text, "href": null }] }
    })
}

pub(crate) fn paragraph(n: u32, text: &str) -> Value {
    text_block(n, "paragraph", text)
}

pub(crate) fn bulleted(n: u32, text: &str) -> Value {
    text_block(n, "bulleted_list_item", text)
}

pub(crate) fn toggle(n: u32, text: &str) -> Value {
    text_block(n, "toggle", text)
}

pub(crate) fn child_page(n: u32, title: &str) -> Value {
    json!({
        "object": "block",
        "id": dashed(n),
        "type": "child_page",
        "child_page": { "title": title }
    })
}

pub(crate) fn link_to_page(n: u32, target: u32) -> Value {
    json!({
        "object": "block",
        "id": dashed(n),
        "type": "link_to_page",
        "link_to_page": { "type": "page_id", "page_id": dashed(target) }
    })
}

pub(crate) fn link_to_database(n: u32, target: u32) -> Value {
    json!({
        "object": "block",
        "id": dashed(n),
        "type": "link_to_page",
        "link_to_page": { "type": "database_id", "database_id": dashed(target) }
    })
}

/// A response played back instead of the workspace content.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    /// Error status with an optional `Retry-After`.
    Status(u16, Option<Duration>),
    /// No HTTP response at all.
    Fail(TransportFailure),
    /// Sleeps this long, then serves normally.
    Hang(Duration),
}

#[derive(Debug, Clone)]
struct FakePage {
    title: String,
    blocks: Vec<Value>,
    status: Option<u16>,
    delay: Duration,
}

pub(crate) struct FakeWorkspace {
    pages: HashMap<String, FakePage>,
    children: HashMap<String, Vec<Value>>,
    page_size: usize,
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Counts one call as in flight until dropped, so cancelled calls count too.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeWorkspace {
    pub(crate) fn new() -> Self {
        Self {
            pages: HashMap::new(),
            children: HashMap::new(),
            page_size: 100,
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn page(mut self, n: u32, title: &str, blocks: Vec<Value>) -> Self {
        self.pages.insert(
            id(n),
            FakePage {
                title: title.to_string(),
                blocks,
                status: None,
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Children of a non-page block.
    pub(crate) fn children(mut self, n: u32, blocks: Vec<Value>) -> Self {
        self.children.insert(id(n), blocks);
        self
    }

    /// Every request for page `n` answers 403.
    pub(crate) fn deny(self, n: u32) -> Self {
        self.with_status(n, 403)
    }

    pub(crate) fn with_status(mut self, n: u32, status: u16) -> Self {
        let page = self.pages.entry(id(n)).or_insert_with(|| FakePage {
            title: String::new(),
            blocks: Vec::new(),
            status: None,
            delay: Duration::ZERO,
        });
        page.status = Some(status);
        self
    }

    /// Page metadata for `n` takes this long to arrive.
    pub(crate) fn delay(mut self, n: u32, delay: Duration) -> Self {
        if let Some(page) = self.pages.get_mut(&id(n)) {
            page.delay = delay;
        }
        self
    }

    /// Server-side cap on blocks per listing page.
    pub(crate) fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub(crate) fn script(self, endpoint: &str, responses: Vec<Scripted>) -> Self {
        self.scripts
            .lock()
            .entry(endpoint.to_string())
            .or_default()
            .extend(responses);
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn request_count(&self, endpoint: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }

    /// Most `get` calls that were running at the same time.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn next_script(&self, endpoint: &str) -> Option<Scripted> {
        self.scripts.lock().get_mut(endpoint)?.pop_front()
    }

    fn has_children(&self, block: &Value) -> bool {
        let key = block
            .get("id")
            .and_then(Value::as_str)
            .map(|raw| raw.replace('-', ""))
            .unwrap_or_default();
        match block.get("type").and_then(Value::as_str) {
            Some("child_page") => self
                .pages
                .get(&key)
                .map(|p| !p.blocks.is_empty())
                .unwrap_or(false),
            _ => self.children.contains_key(&key),
        }
    }

    fn serve_page(&self, key: &str, request: &ApiRequest) -> (u16, Value) {
        match self.pages.get(key) {
            Some(FakePage {
                status: Some(status),
                ..
            }) => (*status, error_body(*status)),
            Some(page) => (
                200,
                json!({
                    "object": "page",
                    "id": request.endpoint.trim_start_matches("pages/"),
                    "properties": {
                        "title": {
                            "type": "title",
                            "title": [{ "plain_text": page.title, "href": null }]
                        }
                    }
                }),
            ),
            None => (404, error_body(404)),
        }
    }

    fn serve_children(&self, key: &str, request: &ApiRequest) -> (u16, Value) {
        let blocks = match (self.pages.get(key), self.children.get(key)) {
            (
                Some(FakePage {
                    status: Some(status),
                    ..
                }),
                _,
            ) => return (*status, error_body(*status)),
            (Some(page), _) => &page.blocks,
            (None, Some(blocks)) => blocks,
            (None, None) => return (404, error_body(404)),
        };

        let requested = request
            .query_value("page_size")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(100);
        let size = requested.min(self.page_size).max(1);
        let start = request
            .query_value("start_cursor")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0)
            .min(blocks.len());
        let end = (start + size).min(blocks.len());
        let has_more = end < blocks.len();

        let results: Vec<Value> = blocks[start..end]
            .iter()
            .map(|block| {
                let mut block = block.clone();
                block["has_children"] = Value::Bool(self.has_children(&block));
                block
            })
            .collect();

        (
            200,
            json!({
                "object": "list",
                "results": results,
                "next_cursor": if has_more { Value::String(end.to_string()) } else { Value::Null },
                "has_more": has_more
            }),
        )
    }
}

fn error_body(status: u16) -> Value {
    let code = match status {
        400 => "validation_error",
        401 => "unauthorized",
        403 => "restricted_resource",
        404 => "object_not_found",
        429 => "rate_limited",
        500 => "internal_server_error",
        503 => "service_unavailable",
        _ => "unknown",
    };
    json!({
        "object": "error",
        "status": status,
        "code": code,
        "message": format!("HTTP {}", status)
    })
}

fn respond(request: &ApiRequest, status: u16, body: Value, retry_after: Option<Duration>) -> ApiResponse<String> {
    ApiResponse {
        data: body.to_string(),
        status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        url: format!("fake://{}", request),
        retry_after,
    }
}

#[async_trait::async_trait]
impl NotionTransport for FakeWorkspace {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse<String>, TransportFailure> {
        self.requests.lock().push(request.clone());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        match self.next_script(&request.endpoint) {
            Some(Scripted::Status(status, retry_after)) => {
                return Ok(respond(request, status, error_body(status), retry_after))
            }
            Some(Scripted::Fail(failure)) => return Err(failure),
            Some(Scripted::Hang(duration)) => tokio::time::sleep(duration).await,
            None => {}
        }

        let segments: Vec<&str> = request.endpoint.split('/').collect();
        let (status, body) = match segments.as_slice() {
            ["pages", raw] => {
                let key = raw.replace('-', "");
                let delay = self.pages.get(&key).map(|p| p.delay).unwrap_or_default();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                self.serve_page(&key, request)
            }
            ["blocks", raw, "children"] => self.serve_children(&raw.replace('-', ""), request),
            _ => (400, error_body(400)),
        };
        Ok(respond(request, status, body, None))
    }
}
