//! # Pagination
//!
//! Walks a cursor-paginated API, collecting the items of every page.

use std::collections::HashSet;
use std::future::Future;

/// One page of results and the cursor of the next one, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// Fetches pages starting at `first` until the cursor runs out, repeats, or
/// `max_pages` pages have been read.
pub async fn paginate<T, E, F, Fut>(first: String, max_pages: usize, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = Some(first);

    while let Some(current) = cursor.take() {
        if seen.len() >= max_pages || !seen.insert(current.clone()) {
            break;
        }
        let page = fetch(current).await?;
        items.extend(page.items);
        cursor = page.next.filter(|next| !next.is_empty());
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn numbered(cursor: String) -> Result<Page<u32>, String> {
        let n: u32 = cursor.parse().map_err(|_| "bad cursor".to_string())?;
        Ok(Page {
            items: vec![n * 10, n * 10 + 1],
            next: (n < 3).then(|| (n + 1).to_string()),
        })
    }

    #[tokio::test]
    async fn test_collects_until_cursor_exhausted() {
        let items = paginate("1".to_string(), 10, numbered).await.unwrap();
        assert_eq!(items, vec![10, 11, 20, 21, 30, 31]);
    }

    #[tokio::test]
    async fn test_respects_page_cap() {
        let items = paginate("1".to_string(), 2, numbered).await.unwrap();
        assert_eq!(items, vec![10, 11, 20, 21]);
    }

    #[tokio::test]
    async fn test_stops_on_repeated_cursor() {
        let mut calls = 0;
        let items = paginate("same".to_string(), 10, |cursor| {
            calls += 1;
            async move {
                Ok::<_, String>(Page {
                    items: vec![cursor.clone()],
                    next: Some(cursor),
                })
            }
        })
        .await
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_error_aborts() {
        let result = paginate("x".to_string(), 10, numbered).await;
        assert_eq!(result, Err("bad cursor".to_string()));
    }
}
