// SPDX-License-Identifier: MPL-2.0
//! The display-surface collaborator interface.
//!
//! The engine never renders anything itself. Every mutation of the active
//! set hands an ordered snapshot to a [`Dispatcher`], and eviction waits for
//! the dispatcher's removal animation to complete before the slot is freed.

use crate::notice::Notice;
use futures_util::future::BoxFuture;

/// Consumer of active-set snapshots and removal animations.
///
/// Implementations are expected to be fast in [`render`](Dispatcher::render)
/// (fire-and-forget) and to always eventually resolve the future returned by
/// [`animate_removal`](Dispatcher::animate_removal); a misbehaving
/// implementation can be bounded with
/// [`Config::removal_timeout_secs`](crate::config::Config::removal_timeout_secs).
pub trait Dispatcher: Send + Sync {
    /// Presents the current ordered active set.
    ///
    /// Called after every activation and eviction with a fresh snapshot.
    fn render(&self, active: &[Notice]);

    /// Begins a removal animation for the head notice and resolves when it
    /// has finished. The eviction loop blocks only its own suspension point
    /// on this future, never the scheduler.
    fn animate_removal<'a>(&'a self, notice: &'a Notice) -> BoxFuture<'a, ()>;
}

/// A dispatcher that does nothing, for headless or test use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatcher;

impl Dispatcher for NoopDispatcher {
    fn render(&self, _active: &[Notice]) {}

    fn animate_removal<'a>(&'a self, _notice: &'a Notice) -> BoxFuture<'a, ()> {
        Box::pin(futures_util::future::ready(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Category;

    #[tokio::test]
    async fn noop_removal_resolves_immediately() {
        let dispatcher = NoopDispatcher;
        let notice = Notice::new(Category::Info, "test");
        dispatcher.animate_removal(&notice).await;
    }

    #[test]
    fn noop_render_accepts_any_snapshot() {
        let dispatcher = NoopDispatcher;
        dispatcher.render(&[]);
        dispatcher.render(&[Notice::new(Category::Error, "boom")]);
    }
}
