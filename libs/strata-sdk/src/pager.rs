//! Offset/limit chunked pagination with Stream API
//!
//! List endpoints take `offset` and `limit` and return one chunk per call.
//! [`OffsetPager`] drives those calls and yields individual items, stopping
//! after a short chunk or when an overall item limit is reached.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures_util::TryStreamExt;
//! use strata_sdk::pager::{Chunk, OffsetPager};
//!
//! let all: Vec<Value> = OffsetPager::new(1000, None, |chunk: Chunk| async move {
//!     fetch_subscriptions(&conn, chunk.offset, chunk.limit).await
//! })
//! .try_collect()
//! .await?;
//! ```

use futures_core::Stream;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Window requested from the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub offset: usize,
    pub limit: usize,
}

pin_project! {
    /// Stream of items fetched chunk by chunk.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The item type
    /// * `E` - The error type
    /// * `F` - The fetcher function type
    /// * `Fut` - The future returned by the fetcher
    pub struct OffsetPager<T, E, F, Fut>
    where
        F: FnMut(Chunk) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        chunk_size: usize,
        remaining: Option<usize>,
        offset: usize,
        buffer: VecDeque<T>,
        done: bool,
        fetcher: F,
        #[pin]
        current_fetch: Option<Fut>,
    }
}

impl<T, E, F, Fut> OffsetPager<T, E, F, Fut>
where
    F: FnMut(Chunk) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    /// Create a pager.
    ///
    /// * `chunk_size` - items requested per call (clamped to at least 1)
    /// * `limit` - stop after this many items; `None` fetches everything
    /// * `fetcher` - performs one call for the given [`Chunk`]
    pub fn new(chunk_size: usize, limit: Option<usize>, fetcher: F) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            remaining: limit,
            offset: 0,
            buffer: VecDeque::new(),
            done: limit == Some(0),
            fetcher,
            current_fetch: None,
        }
    }
}

impl<T, E, F, Fut> Stream for OffsetPager<T, E, F, Fut>
where
    F: FnMut(Chunk) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(item) = this.buffer.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if *this.done {
                return Poll::Ready(None);
            }

            if let Some(fut) = this.current_fetch.as_mut().as_pin_mut() {
                match fut.poll(cx) {
                    Poll::Ready(Ok(mut items)) => {
                        this.current_fetch.set(None);

                        let requested = next_limit(*this.chunk_size, *this.remaining);
                        // The server may ignore `limit`; never yield past it.
                        items.truncate(requested);
                        let received = items.len();

                        *this.offset += received;
                        if let Some(remaining) = this.remaining.as_mut() {
                            *remaining -= received;
                            if *remaining == 0 {
                                *this.done = true;
                            }
                        }
                        if received < requested {
                            *this.done = true;
                        }

                        this.buffer.extend(items);
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.current_fetch.set(None);
                        *this.done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            let limit = next_limit(*this.chunk_size, *this.remaining);
            let fut = (this.fetcher)(Chunk {
                offset: *this.offset,
                limit,
            });
            this.current_fetch.set(Some(fut));
        }
    }
}

fn next_limit(chunk_size: usize, remaining: Option<usize>) -> usize {
    remaining.map_or(chunk_size, |r| chunk_size.min(r))
}
