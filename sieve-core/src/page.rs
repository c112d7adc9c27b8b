//! Paged sequences
//!
//! A page source returns one batch of items plus an optional continuation
//! token; [`page_stream`] drains successive pages as a single stream of items.
//! The stream ends when the source returns no page, an empty page, or a page
//! without a continuation token.

use crate::{CoreResult, DataQuery, GeneratorConfig};
use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// One batch of items and the token locating the next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, C> {
    pub data: Vec<T>,
    pub continuation: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn new(data: Vec<T>, continuation: Option<C>) -> Self {
        Self { data, continuation }
    }

    /// A page with no following page.
    pub fn last(data: Vec<T>) -> Self {
        Self {
            data,
            continuation: None,
        }
    }
}

/// Response of a data service for a single `DataQuery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    /// Total number of matching items, when the service reports it
    #[serde(default)]
    pub count: u64,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T> DataResponse<T> {
    pub fn new(value: Vec<T>, count: u64) -> Self {
        Self { count, value }
    }
}

/// Asynchronous source of successive pages.
#[async_trait]
pub trait PageSource<T: Send, C: Send>: Send {
    /// Load the page at `continuation`, or the first page when it is `None`.
    async fn next_page(&mut self, continuation: Option<C>) -> CoreResult<Option<Page<T, C>>>;
}

enum Cursor<C> {
    Start,
    Next(C),
    Done,
}

impl<C> Cursor<C> {
    fn token(self) -> Option<Option<C>> {
        match self {
            Cursor::Done => None,
            Cursor::Start => Some(None),
            Cursor::Next(token) => Some(Some(token)),
        }
    }
}

type Batch<T> = stream::Iter<std::vec::IntoIter<CoreResult<T>>>;

fn advance<T, C>(loaded: CoreResult<Option<Page<T, C>>>) -> Option<(Batch<T>, Cursor<C>)> {
    match loaded {
        Ok(Some(page)) if !page.data.is_empty() => {
            tracing::trace!(items = page.data.len(), last = page.continuation.is_none(), "loaded page");
            let next = match page.continuation {
                Some(token) => Cursor::Next(token),
                None => Cursor::Done,
            };
            let items: Vec<CoreResult<T>> = page.data.into_iter().map(Ok).collect();
            Some((stream::iter(items), next))
        }
        Ok(_) => None,
        Err(err) => Some((stream::iter(vec![Err(err)]), Cursor::Done)),
    }
}

/// Stream every item of every page produced by `query`.
///
/// `query` receives `None` for the first page and the previous page's
/// continuation token afterwards. A source error is yielded once and ends
/// the stream.
pub fn page_stream<T, C, F, Fut>(query: F) -> impl Stream<Item = CoreResult<T>>
where
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = CoreResult<Option<Page<T, C>>>>,
{
    stream::unfold((query, Cursor::Start), |(mut query, cursor)| async move {
        let token = cursor.token()?;
        let (items, next) = advance(query(token).await)?;
        Some((items, (query, next)))
    })
    .flatten()
}

/// Stream every item of every page a [`PageSource`] yields.
pub fn source_stream<T, C, S>(source: S) -> impl Stream<Item = CoreResult<T>>
where
    T: Send,
    C: Send,
    S: PageSource<T, C>,
{
    stream::unfold((source, Cursor::Start), |(mut source, cursor)| async move {
        let token = cursor.token()?;
        let (items, next) = advance(source.next_page(token).await)?;
        Some((items, (source, next)))
    })
    .flatten()
}

/// Stream every item matched by `query`, fetching `top`-sized pages.
///
/// Pages start at `query.skip` (or zero) and advance by the number of items
/// each response returned; an empty response ends the stream. The
/// configured `default_page_size` applies when the query has no `top`.
pub fn data_page_stream<T, F, Fut>(
    query: DataQuery,
    config: &GeneratorConfig,
    mut fetch: F,
) -> impl Stream<Item = CoreResult<T>>
where
    F: FnMut(DataQuery) -> Fut,
    Fut: Future<Output = CoreResult<DataResponse<T>>>,
{
    let top = query.top.unwrap_or(config.default_page_size);
    let start = query.skip.unwrap_or(0);
    page_stream(move |skip: Option<u32>| {
        let skip = skip.unwrap_or(start);
        let response = fetch(query.page(skip, top));
        async move {
            let response: DataResponse<T> = response.await?;
            if response.value.is_empty() {
                return Ok(None);
            }
            let fetched = u32::try_from(response.value.len()).unwrap_or(u32::MAX);
            Ok(Some(Page::new(response.value, Some(skip.saturating_add(fetched)))))
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================
