// tests/common/mod.rs
//! Shared helpers for the HTTP-level tests: a mock Notion API built on
//! wiremock and options tuned so the tests do not wait on the rate limiter.

#![allow(dead_code)]

use notion_scraper::{ApiKey, BackoffPolicy, LoadOptions, RateLimit, RetryPolicy, ValidatedUrl};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "secret_integration_test_key_0123456789";

pub const ROOT_ID: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90";
pub const ROOT_DASHED: &str = "a1b2c3d4-e5f6-0718-293a-4b5c6d7e8f90";
pub const NOTES_DASHED: &str = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0";
pub const TOGGLE_DASHED: &str = "c0000001-0000-4000-8000-000000000004";

pub fn api_key() -> ApiKey {
    ApiKey::new(TEST_KEY).unwrap()
}

/// Defaults with a generous bucket and millisecond backoff.
pub fn fast_options(server: &MockServer) -> LoadOptions {
    LoadOptions {
        rate_limit: RateLimit {
            capacity: 100,
            refill_per_second: 100.0,
        },
        retry: RetryPolicy {
            backoff: BackoffPolicy {
                base_delay: Duration::from_millis(5),
                jitter: 0.0,
                ..BackoffPolicy::default()
            },
            default_retry_after: Duration::from_millis(5),
            ..RetryPolicy::default()
        },
        base_url: Some(base_url(server)),
        ..LoadOptions::default()
    }
}

pub fn base_url(server: &MockServer) -> ValidatedUrl {
    ValidatedUrl::parse(&format!("{}/v1", server.uri())).unwrap()
}

pub fn page_body(dashed_id: &str, title: &str) -> Value {
    json!({
        "object": "page",
        "id": dashed_id,
        "properties": {
            "title": {
                "id": "title",
                "type": "title",
                "title": [{ "type": "text", "plain_text": title, "href": null }]
            }
        }
    })
}

pub fn listing(results: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": results,
        "next_cursor": next_cursor,
        "has_more": next_cursor.is_some()
    })
}

pub fn paragraph(dashed_id: &str, text: &str) -> Value {
    json!({
        "object": "block",
        "id": dashed_id,
        "type": "paragraph",
        "has_children": false,
        "paragraph": { "rich_text": [{ "type": "text", "plain_text": text, "href": null }] }
    })
}

pub fn error_body(status: u16, code: &str) -> Value {
    json!({
        "object": "error",
        "status": status,
        "code": code,
        "message": format!("{} from mock", code)
    })
}

pub async fn mount_json(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{}", endpoint)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts the "Project plan" workspace: the root from the JSON fixtures,
/// one toggle with a nested paragraph and the "Meeting notes" child page.
pub async fn mount_project_plan(server: &MockServer) {
    let page: Value =
        serde_json::from_str(include_str!("../fixtures/api_responses/page_project_plan.json"))
            .unwrap();
    let blocks: Value =
        serde_json::from_str(include_str!("../fixtures/api_responses/blocks_project_plan.json"))
            .unwrap();

    mount_json(server, &format!("pages/{}", ROOT_DASHED), page).await;
    mount_json(server, &format!("blocks/{}/children", ROOT_DASHED), blocks).await;
    mount_json(
        server,
        &format!("blocks/{}/children", TOGGLE_DASHED),
        listing(
            vec![paragraph("c0000001-0000-4000-8000-000000000041", "hidden until opened")],
            None,
        ),
    )
    .await;

    mount_json(server, &format!("pages/{}", NOTES_DASHED), page_body(NOTES_DASHED, "Meeting notes")).await;
    mount_json(
        server,
        &format!("blocks/{}/children", NOTES_DASHED),
        listing(
            vec![paragraph("c0000002-0000-4000-8000-000000000001", "Decided to ship on Friday")],
            None,
        ),
    )
    .await;
}
