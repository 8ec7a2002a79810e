//! Concurrent processing utilities for domain probing.
//!
//! A bounded fan-out over a list of items that can hand results back either
//! as they complete or in input order.

use futures::stream::{self, Stream, StreamExt};
use std::future::Future;

/// Runs one async task per item with at most `max_concurrency` in flight.
pub(crate) struct ConcurrentProcessor {
    max_concurrency: usize,
}

impl ConcurrentProcessor {
    pub(crate) fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub(crate) fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Yield `(input index, output)` pairs as tasks complete.
    pub(crate) fn run_unordered<'a, T, R, F, Fut>(
        &'a self,
        items: Vec<T>,
        task: F,
    ) -> impl Stream<Item = (usize, R)> + 'a
    where
        T: 'a,
        R: 'a,
        F: Fn(T) -> Fut + 'a,
        Fut: Future<Output = R> + 'a,
    {
        stream::iter(items.into_iter().enumerate())
            .map(move |(idx, item)| {
                let work = task(item);
                async move { (idx, work.await) }
            })
            .buffer_unordered(self.max_concurrency)
    }

    /// Run every task and return the outputs in input order.
    pub(crate) async fn run_ordered<T, R, F, Fut>(&self, items: Vec<T>, task: F) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let mut indexed: Vec<(usize, R)> = self.run_unordered(items, task).collect().await;
        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, output)| output).collect()
    }
}
