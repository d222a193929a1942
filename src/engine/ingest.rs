// SPDX-License-Identifier: MPL-2.0
//! Producer-facing FIFO of notices awaiting activation.
//!
//! Any number of threads may enqueue concurrently; the scheduler is the
//! single consumer. Enqueueing never blocks and never fails — when the
//! optional ceiling is reached, the configured overflow policy decides
//! which notice is dropped.

use super::lock;
use crate::config::OverflowPolicy;
use crate::notice::Notice;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use tracing::warn;

pub(crate) struct IngestQueue {
    items: Mutex<VecDeque<Notice>>,
    ready: Notify,
    ceiling: Option<usize>,
    overflow: OverflowPolicy,
}

impl IngestQueue {
    pub(crate) fn new(ceiling: Option<usize>, overflow: OverflowPolicy) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            ready: Notify::new(),
            ceiling,
            overflow,
        }
    }

    /// Appends a notice. Non-blocking, safe from any thread.
    pub(crate) fn enqueue(&self, notice: Notice) {
        {
            let mut items = lock(&self.items);
            if let Some(max) = self.ceiling {
                if items.len() >= max {
                    match self.overflow {
                        OverflowPolicy::DropOldest => {
                            if let Some(dropped) = items.pop_front() {
                                warn!(
                                    dropped = dropped.id().value(),
                                    max, "ingest queue full, dropping oldest notice"
                                );
                            }
                        }
                        OverflowPolicy::RejectNewest => {
                            warn!(
                                rejected = notice.id().value(),
                                max, "ingest queue full, rejecting incoming notice"
                            );
                            return;
                        }
                    }
                }
            }
            items.push_back(notice);
        }
        self.ready.notify_one();
    }

    /// Removes and returns the oldest queued notice, if any.
    ///
    /// Single consumer: only the scheduler loop calls this.
    pub(crate) fn drain(&self) -> Option<Notice> {
        lock(&self.items).pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.items).len()
    }

    /// A future that resolves once a notice has been enqueued.
    ///
    /// Create the future before re-checking [`drain`](Self::drain) so an
    /// enqueue between the check and the await is not missed.
    pub(crate) fn ready(&self) -> Notified<'_> {
        self.ready.notified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Category;

    fn notice(message: &str) -> Notice {
        Notice::new(Category::Info, message)
    }

    #[tokio::test]
    async fn drain_returns_items_in_fifo_order() {
        let queue = IngestQueue::new(None, OverflowPolicy::default());
        queue.enqueue(notice("first"));
        queue.enqueue(notice("second"));
        queue.enqueue(notice("third"));

        assert_eq!(queue.drain().unwrap().message(), "first");
        assert_eq!(queue.drain().unwrap().message(), "second");
        assert_eq!(queue.drain().unwrap().message(), "third");
        assert!(queue.drain().is_none());
    }

    #[tokio::test]
    async fn drain_on_empty_queue_is_none() {
        let queue = IngestQueue::new(None, OverflowPolicy::default());
        assert!(queue.drain().is_none());
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn enqueue_wakes_a_waiting_consumer() {
        let queue = std::sync::Arc::new(IngestQueue::new(None, OverflowPolicy::default()));

        let consumer = {
            let queue = std::sync::Arc::clone(&queue);
            tokio::spawn(async move {
                loop {
                    let ready = queue.ready();
                    if let Some(n) = queue.drain() {
                        return n;
                    }
                    ready.await;
                }
            })
        };

        queue.enqueue(notice("wake up"));
        let drained = tokio::time::timeout(std::time::Duration::from_secs(1), consumer)
            .await
            .expect("consumer should be woken")
            .expect("consumer task should not panic");
        assert_eq!(drained.message(), "wake up");
    }

    #[tokio::test]
    async fn drop_oldest_keeps_the_newest_items() {
        let queue = IngestQueue::new(Some(2), OverflowPolicy::DropOldest);
        queue.enqueue(notice("first"));
        queue.enqueue(notice("second"));
        queue.enqueue(notice("third"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().unwrap().message(), "second");
        assert_eq!(queue.drain().unwrap().message(), "third");
    }

    #[tokio::test]
    async fn reject_newest_keeps_the_oldest_items() {
        let queue = IngestQueue::new(Some(2), OverflowPolicy::RejectNewest);
        queue.enqueue(notice("first"));
        queue.enqueue(notice("second"));
        queue.enqueue(notice("third"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().unwrap().message(), "first");
        assert_eq!(queue.drain().unwrap().message(), "second");
    }
}
