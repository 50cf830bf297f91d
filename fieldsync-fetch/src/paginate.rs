//! Pagination driver.
//!
//! List endpoints return at most `limit` results starting at `cursor`. The
//! driver walks a collection from offset zero, one fixed-size page at a time,
//! and stops at the first short page. A collection whose size is an exact
//! multiple of the page size therefore costs one extra, empty fetch.

use std::future::Future;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::SyncError;

/// Page size used when callers do not choose one.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(size) => size,
    None => unreachable!(),
};

// ============================================================================
// Page Cursor
// ============================================================================

/// Position of one page within a collection walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    offset: u64,
    page_size: NonZeroU32,
}

impl PageCursor {
    /// The first page.
    pub fn first(page_size: NonZeroU32) -> Self {
        Self {
            offset: 0,
            page_size,
        }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Items requested per page.
    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    /// The following page, or an error if the offset would overflow.
    pub fn advance(self) -> Result<Self, SyncError> {
        let offset = self
            .offset
            .checked_add(u64::from(self.page_size.get()))
            .ok_or_else(|| SyncError::InvalidRequest("page offset overflow".into()))?;
        Ok(Self { offset, ..self })
    }
}

// ============================================================================
// List Page
// ============================================================================

/// One page of a list endpoint's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    /// Offset the page started at.
    #[serde(default)]
    pub cursor: u64,
    /// Items on this page.
    pub results: Vec<T>,
    /// Items after this page, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
    /// Items on this page, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl<T> ListPage<T> {
    /// Returns true if the page is shorter than `page_size`.
    pub fn is_last(&self, page_size: u32) -> bool {
        self.results.len() < page_size as usize
    }
}

// ============================================================================
// Fetch All
// ============================================================================

/// Fetches every page through `fetch_page` and concatenates the results in
/// order.
///
/// Any page error ends the walk and is returned; items from earlier pages
/// are discarded. Cancellation is checked before each page.
pub async fn fetch_all<T, F, Fut>(
    page_size: NonZeroU32,
    cancel: &CancellationToken,
    mut fetch_page: F,
) -> Result<Vec<T>, SyncError>
where
    F: FnMut(PageCursor) -> Fut,
    Fut: Future<Output = Result<Vec<T>, SyncError>>,
{
    let mut items = Vec::new();
    let mut cursor = PageCursor::first(page_size);
    let mut pages = 0_u32;

    loop {
        if cancel.is_cancelled() {
            debug!(pages, "Pagination cancelled");
            return Err(SyncError::CANCELLED);
        }

        let page = fetch_page(cursor).await?;
        pages += 1;
        let short = page.len() < page_size.get() as usize;
        debug!(
            offset = cursor.offset(),
            received = page.len(),
            "Fetched page"
        );
        items.extend(page);

        if short {
            info!(pages, total = items.len(), "Pagination complete");
            return Ok(items);
        }
        cursor = cursor.advance()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    /// Serves pages of the given lengths, numbering items by global index,
    /// and returns the result with the offsets requested.
    async fn run(lengths: &[usize], page_size: u32) -> (Result<Vec<u64>, SyncError>, Vec<u64>) {
        let seen = Mutex::new(Vec::new());
        let result = fetch_all(size(page_size), &CancellationToken::new(), |cursor| {
            seen.lock().unwrap().push(cursor.offset());
            let index = seen.lock().unwrap().len() - 1;
            let len = lengths.get(index).copied().unwrap_or(0);
            let start = cursor.offset();
            async move { Ok((start..start + len as u64).collect()) }
        })
        .await;
        let offsets = seen.into_inner().unwrap();
        (result, offsets)
    }

    #[tokio::test]
    async fn test_short_last_page() {
        let (result, offsets) = run(&[100, 100, 47], 100).await;
        let items = result.unwrap();
        assert_eq!(items.len(), 247);
        assert_eq!(items, (0..247).collect::<Vec<_>>());
        assert_eq!(offsets, vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_exact_multiple_costs_one_empty_fetch() {
        let (result, offsets) = run(&[100, 100, 0], 100).await;
        assert_eq!(result.unwrap().len(), 200);
        assert_eq!(offsets, vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let (result, offsets) = run(&[0], 25).await;
        assert!(result.unwrap().is_empty());
        assert_eq!(offsets, vec![0]);
    }

    #[tokio::test]
    async fn test_page_error_aborts() {
        let mut calls = 0;
        let result: Result<Vec<u32>, _> =
            fetch_all(size(2), &CancellationToken::new(), |_| {
                calls += 1;
                let fail = calls == 2;
                async move {
                    if fail {
                        Err(SyncError::ServerError(503))
                    } else {
                        Ok(vec![1, 2])
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap_err(), SyncError::ServerError(503));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_cancellation_between_pages() {
        let cancel = CancellationToken::new();
        let mut calls = 0;
        let result: Result<Vec<u32>, _> = fetch_all(size(1), &cancel, |_| {
            calls += 1;
            if calls == 2 {
                cancel.cancel();
            }
            async { Ok(vec![7]) }
        })
        .await;
        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_cursor_overflow() {
        let cursor = PageCursor {
            offset: u64::MAX - 5,
            page_size: size(10),
        };
        assert!(matches!(
            cursor.advance(),
            Err(SyncError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_list_page_decoding() {
        let page: ListPage<u32> = crate::decode::decode(
            200,
            br#"{"response": {"cursor": 0, "results": [1, 2], "remaining": 0, "count": 2}}"#,
        )
        .unwrap();
        assert_eq!(page.results, vec![1, 2]);
        assert_eq!(page.remaining, Some(0));
        assert!(page.is_last(100));

        let missing: Result<ListPage<u32>, _> =
            crate::decode::decode(200, br#"{"response": {"cursor": 0}}"#);
        assert!(missing.is_err());
    }
}
