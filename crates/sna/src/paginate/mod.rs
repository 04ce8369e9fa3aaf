//! Cursor-following retrieval for token-paginated listing endpoints.
//!
//! Every listing (followers, liked tweets, retweeters, ...) goes through
//! [`paginate`]. Pages are requested one at a time; the next request is not
//! issued until the previous page has been consumed.
//!
//! The platform is trusted to emit a finite token chain. A server that
//! returned the same token forever would keep the loop running until `limit`
//! (if any) is reached.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;

/// Cursor state for one paginated retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// ID of the user or tweet whose listing is fetched.
    pub subject: String,
    /// Items requested per page, never above the endpoint maximum.
    pub page_size: u32,
    /// Token of the page to fetch; `None` for the first page.
    pub cursor_token: Option<String>,
}

impl PageRequest {
    /// Start a retrieval, clamping `page_size` into `1..=endpoint_max`.
    #[must_use]
    pub fn new(subject: impl Into<String>, page_size: u32, endpoint_max: u32) -> Self {
        Self {
            subject: subject.into(),
            page_size: page_size.clamp(1, endpoint_max.max(1)),
            cursor_token: None,
        }
    }

    /// Request no more than `limit` items per page, but not fewer than the
    /// endpoint minimum.
    #[must_use]
    pub fn fit_to_limit(mut self, limit: Option<usize>, endpoint_min: u32) -> Self {
        if let Some(limit) = limit {
            let limit = u32::try_from(limit).unwrap_or(u32::MAX);
            if limit < self.page_size {
                self.page_size = limit.max(endpoint_min).min(self.page_size);
            }
        }
        self
    }

    /// Replace the cursor with the token of the next page.
    pub fn advance(&mut self, token: String) {
        self.cursor_token = Some(token);
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page; `None` when the endpoint returned no data.
    pub items: Option<Vec<T>>,
    /// Token of the following page, if any.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self {
            items: Some(items),
            next_token,
        }
    }

    /// A page without data and without a continuation.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: None,
            next_token: None,
        }
    }

    /// The continuation token, treating an empty token as absent.
    fn continuation(&mut self) -> Option<String> {
        self.next_token.take().filter(|t| !t.is_empty())
    }
}

/// A listing endpoint that can be fetched page by page.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch the page described by `request`.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>>;
}

/// Drive `source` until the listing is exhausted or `limit` items have been
/// collected, applying `project` to every item.
///
/// Stops mid-page as soon as `limit` is reached. A first page without items
/// yields an empty result. Any error from `source` or `project` aborts the
/// retrieval; items collected so far are discarded.
pub async fn paginate<S, T, U, F>(
    source: &S,
    mut request: PageRequest,
    limit: Option<usize>,
    mut project: F,
) -> Result<Vec<U>>
where
    S: PageSource<T> + ?Sized,
    F: FnMut(T) -> Result<U>,
{
    let mut results = Vec::new();
    if limit == Some(0) {
        return Ok(results);
    }

    let mut pages = 0_usize;
    loop {
        let mut page = source.fetch_page(&request).await?;
        pages += 1;

        let Some(items) = page.items.take() else {
            debug!(subject = %request.subject, pages, "Page carried no data, stopping");
            break;
        };
        debug!(
            subject = %request.subject,
            page = pages,
            items = items.len(),
            "Fetched page"
        );

        for item in items {
            results.push(project(item)?);
            if limit.is_some_and(|l| results.len() >= l) {
                info!(subject = %request.subject, pages, count = results.len(), "Pagination limit reached");
                return Ok(results);
            }
        }

        match page.continuation() {
            Some(token) => request.advance(token),
            None => break,
        }
    }

    info!(subject = %request.subject, pages, count = results.len(), "Pagination complete");
    Ok(results)
}

/// [`paginate`] without projection.
pub async fn paginate_all<S, T>(source: &S, request: PageRequest, limit: Option<usize>) -> Result<Vec<T>>
where
    S: PageSource<T> + ?Sized,
{
    paginate(source, request, limit, Ok).await
}
