//! Lazy page-by-page walker over a paginated collection
//!
//! The walker drives a fetch → yield → continue loop: it fetches one page,
//! hands items out one at a time in page order, and fetches the next page
//! only once the current one is exhausted. At most one page is resident at
//! any time, regardless of collection size.

use crate::walk::cursor::{Cursor, Page};
use crate::Result;
use std::collections::VecDeque;
use std::future::Future;

/// Explicit iterator over the items of a paginated remote collection.
///
/// Built over a fetch closure that is handed the cursor for the page to
/// load: the empty start cursor for the first page, then whichever cursor
/// the previous page returned. The closure is only invoked again while the
/// previous page reported a non-empty continuation, so callers never need
/// to distinguish "first" from "next" themselves.
///
/// Nested collections (channels within a team, items within a list) are
/// plain recursion: a consumer of one walker may construct and drive
/// another.
///
/// A non-transient fetch failure propagates out of [`next`](Self::next);
/// items already yielded stand, so a walk can make partial progress before
/// surfacing a failure for one page.
pub struct PageWalker<T, F, Fut>
where
    F: FnMut(Cursor) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    fetch: F,
    buffered: VecDeque<T>,
    cursor: Cursor,
    started: bool,
    finished: bool,
}

impl<T, F, Fut> PageWalker<T, F, Fut>
where
    F: FnMut(Cursor) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    /// Creates a walker positioned at the start of the collection.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            buffered: VecDeque::new(),
            cursor: Cursor::start(),
            started: false,
            finished: false,
        }
    }

    /// Yields the next item, fetching pages as needed.
    ///
    /// Returns `Ok(None)` once the collection is exhausted. A page with an
    /// empty item list but a non-empty cursor means "keep going": the
    /// walker fetches the following page instead of terminating, so a
    /// transient empty page never truncates the walk.
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Ok(Some(item));
            }

            if self.finished {
                return Ok(None);
            }

            // Terminate only after at least one fetch: the start cursor is
            // empty too, and must still load the first page.
            if self.started && self.cursor.is_empty() {
                self.finished = true;
                return Ok(None);
            }

            let page = (self.fetch)(self.cursor.clone()).await?;
            self.started = true;
            self.cursor = page.next;
            self.buffered.extend(page.items);

            tracing::trace!(
                buffered = self.buffered.len(),
                more = !self.cursor.is_empty(),
                "fetched page"
            );
        }
    }

    /// Collects every remaining item into a vector.
    ///
    /// This materializes the whole collection and is meant for small,
    /// bounded collections (and tests); prefer [`next`](Self::next) for
    /// anything that can grow.
    pub async fn collect(mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while let Some(item) = self.next().await? {
            out.push(item);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TideError;
    use std::cell::RefCell;

    /// Fetch closure over a fixed script of pages, counting calls.
    fn scripted(
        pages: Vec<Page<u32>>,
    ) -> (
        std::rc::Rc<RefCell<usize>>,
        impl FnMut(Cursor) -> std::future::Ready<Result<Page<u32>>>,
    ) {
        let calls = std::rc::Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let pages = RefCell::new(pages);
        let fetch = move |_cursor: Cursor| {
            *counter.borrow_mut() += 1;
            let page = pages.borrow_mut().remove(0);
            std::future::ready(Ok(page))
        };
        (calls, fetch)
    }

    #[tokio::test]
    async fn test_single_page_collection() {
        let (calls, fetch) = scripted(vec![Page::last(vec![1, 2, 3])]);
        let walker = PageWalker::new(fetch);

        let items = walker.collect().await.unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_multi_page_visits_all_in_order() {
        let (calls, fetch) = scripted(vec![
            Page::with_next(vec![1, 2], "p2"),
            Page::with_next(vec![3], "p3"),
            Page::last(vec![4, 5, 6]),
        ]);
        let walker = PageWalker::new(fetch);

        let items = walker.collect().await.unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(*calls.borrow(), 3);
    }

    #[tokio::test]
    async fn test_empty_page_with_cursor_continues() {
        let (_, fetch) = scripted(vec![
            Page::with_next(vec![1], "p2"),
            Page::with_next(vec![], "p3"),
            Page::last(vec![2]),
        ]);
        let walker = PageWalker::new(fetch);

        let items = walker.collect().await.unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let (calls, fetch) = scripted(vec![Page::last(vec![])]);
        let mut walker = PageWalker::new(fetch);

        assert!(walker.next().await.unwrap().is_none());
        // Exhaustion is sticky; no further fetches.
        assert!(walker.next().await.unwrap().is_none());
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_fetch_receives_previous_cursor() {
        let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
        let record = seen.clone();
        let pages = RefCell::new(vec![
            Page::with_next(vec![1], "tok-a"),
            Page::last(vec![2]),
        ]);
        let fetch = move |cursor: Cursor| {
            record.borrow_mut().push(cursor.token().map(String::from));
            std::future::ready(Ok(pages.borrow_mut().remove(0)))
        };

        PageWalker::new(fetch).collect().await.unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![None, Some("tok-a".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_propagates_after_partial_progress() {
        let pages = RefCell::new(vec![Page::with_next(vec![1, 2], "p2")]);
        let fetch = move |cursor: Cursor| {
            let result = if cursor.is_empty() {
                Ok(pages.borrow_mut().remove(0))
            } else {
                Err(TideError::UnexpectedStatus {
                    url: "https://api.example.com/sites".to_string(),
                    status: 500,
                })
            };
            std::future::ready(result)
        };
        let mut walker = PageWalker::new(fetch);

        assert_eq!(walker.next().await.unwrap(), Some(1));
        assert_eq!(walker.next().await.unwrap(), Some(2));
        assert!(walker.next().await.is_err());
    }

    #[tokio::test]
    async fn test_nested_walks() {
        // Outer collection of ids; each id drives an inner walk.
        let (_, outer_fetch) = scripted(vec![
            Page::with_next(vec![10, 20], "p2"),
            Page::last(vec![30]),
        ]);
        let mut outer = PageWalker::new(outer_fetch);

        let mut all = Vec::new();
        while let Some(id) = outer.next().await.unwrap() {
            let inner = PageWalker::new(move |_c: Cursor| {
                std::future::ready(Ok(Page::last(vec![id + 1, id + 2])))
            });
            all.extend(inner.collect().await.unwrap());
        }
        assert_eq!(all, vec![11, 12, 21, 22, 31, 32]);
    }
}
