//! Async adapter over a [`BuildOperation`].
//!
//! The stream hands control back to the executor once between checkpoints,
//! so a build can share a single-threaded runtime with other tasks.

use crate::build::{BuildOperation, BuildReport, CacheBuildOperation};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A build driven as a [`Stream`] of checkpoints.
#[derive(Debug)]
pub struct BuildStream<'a> {
    operation: BuildOperation<'a>,
    yield_next: bool,
}

impl<'a> BuildOperation<'a> {
    /// Drive the build from an async executor.
    #[must_use]
    pub fn into_stream(self) -> BuildStream<'a> {
        BuildStream {
            operation: self,
            yield_next: false,
        }
    }
}

impl BuildStream<'_> {
    /// The report so far.
    #[must_use]
    pub fn report(&self) -> &BuildReport {
        self.operation.report()
    }

    /// Returns `true` once the corpus is exhausted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.operation.is_finished()
    }
}

impl Stream for BuildStream<'_> {
    type Item = CacheBuildOperation;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.yield_next {
            this.yield_next = false;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        match this.operation.next() {
            Some(checkpoint) => {
                this.yield_next = true;
                Poll::Ready(Some(checkpoint))
            }
            None => Poll::Ready(None),
        }
    }
}
