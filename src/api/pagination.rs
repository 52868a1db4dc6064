// src/api/pagination.rs
//! Cursor pagination over Notion list endpoints.

use super::responses::PaginatedResponse;
use crate::error::CrawlError;

/// All items of a paginated listing, concatenated in server order.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}

/// Fetches every page of a listing by threading `next_cursor` into the next call.
///
/// A response that claims `has_more` without a cursor is malformed: stopping
/// there would hand back a silently truncated listing.
pub async fn fetch_all_pages<T, F, Fut>(mut fetch_fn: F) -> Result<PaginationResult<T>, CrawlError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, CrawlError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_fn(cursor.take()).await?;
        pages_fetched += 1;
        all_items.extend(response.results);

        if !response.has_more {
            break;
        }
        match response.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                return Err(CrawlError::MalformedResponse(format!(
                    "has_more without next_cursor after {} page(s)",
                    pages_fetched
                )))
            }
        }
    }

    Ok(PaginationResult {
        items: all_items,
        pages_fetched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(results: Vec<u32>, next: Option<&str>, has_more: bool) -> PaginatedResponse<u32> {
        PaginatedResponse {
            object: "list".to_string(),
            results,
            next_cursor: next.map(str::to_string),
            has_more,
        }
    }

    #[tokio::test]
    async fn test_cursor_is_threaded() {
        let mut seen = Vec::new();
        let result = fetch_all_pages(|cursor| {
            seen.push(cursor.clone());
            async move {
                Ok(match cursor.as_deref() {
                    None => page(vec![1, 2], Some("a"), true),
                    Some("a") => page(vec![3], Some("b"), true),
                    _ => page(vec![4], None, false),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 2, 3, 4]);
        assert_eq!(result.pages_fetched, 3);
        assert_eq!(
            seen,
            vec![None, Some("a".to_string()), Some("b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_cursor_is_an_error() {
        let result = fetch_all_pages(|_| async { Ok(page(vec![1], None, true)) }).await;
        assert!(matches!(result, Err(CrawlError::MalformedResponse(_))));
    }
}
