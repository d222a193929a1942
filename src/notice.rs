// SPDX-License-Identifier: MPL-2.0
//! Core notice data structures.
//!
//! This module defines the `Notice` struct and `Category` enum used
//! throughout the scheduling engine. Timestamps are monotonic
//! (`tokio::time::Instant`), so the engine runs unchanged under tokio's
//! paused test clock.

use std::time::Duration;
use tokio::time::Instant;

/// Unique identifier for a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(u64);

impl NoticeId {
    /// Creates a new unique notice ID.
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for NoticeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Classification of a notice, used by the display surface for styling.
///
/// Categories carry no timing behavior: every notice shares the configured
/// display lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Operation completed successfully.
    Success,
    /// Informational message.
    #[default]
    Info,
    /// Warning that doesn't block operation.
    Warning,
    /// Error requiring attention.
    Error,
}

/// A short-lived notice to be displayed to the user.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Unique identifier for this notice.
    id: NoticeId,
    /// Classification for display styling.
    category: Category,
    /// The notice message text.
    message: String,
    /// When this notice entered the ingest queue.
    enqueued_at: Instant,
    /// When this notice was activated into the active set.
    /// `None` while still queued; set exactly once by the scheduler.
    activated_at: Option<Instant>,
}

impl Notice {
    pub(crate) fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            id: NoticeId::new(),
            category,
            message: message.into(),
            enqueued_at: Instant::now(),
            activated_at: None,
        }
    }

    /// Returns the notice's unique ID.
    #[must_use]
    pub fn id(&self) -> NoticeId {
        self.id
    }

    /// Returns the notice category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the notice message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns when this notice entered the ingest queue.
    #[must_use]
    pub fn enqueued_at(&self) -> Instant {
        self.enqueued_at
    }

    /// Returns when this notice was activated, if it has been.
    #[must_use]
    pub fn activated_at(&self) -> Option<Instant> {
        self.activated_at
    }

    /// Stamps the activation instant. Called exactly once by the scheduler.
    pub(crate) fn mark_activated(&mut self, at: Instant) {
        self.activated_at = Some(at);
    }

    /// The instant at which this notice expires from the active set.
    ///
    /// Items in the active set always carry an activation instant; the
    /// enqueue instant is a safe fallback.
    pub(crate) fn deadline(&self, lifetime: Duration) -> Instant {
        self.activated_at.unwrap_or(self.enqueued_at) + lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_ids_are_unique() {
        let a = Notice::new(Category::Info, "a");
        let b = Notice::new(Category::Info, "b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn new_notice_is_not_activated() {
        let notice = Notice::new(Category::Success, "saved");
        assert!(notice.activated_at().is_none());
        assert_eq!(notice.message(), "saved");
        assert_eq!(notice.category(), Category::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_follows_activation_instant() {
        let mut notice = Notice::new(Category::Info, "test");
        tokio::time::advance(Duration::from_secs(5)).await;

        let activated = Instant::now();
        notice.mark_activated(activated);

        let lifetime = Duration::from_secs(3);
        assert_eq!(notice.deadline(lifetime), activated + lifetime);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_falls_back_to_enqueue_instant() {
        let notice = Notice::new(Category::Info, "test");
        let lifetime = Duration::from_secs(3);
        assert_eq!(notice.deadline(lifetime), notice.enqueued_at() + lifetime);
    }

    #[test]
    fn default_category_is_info() {
        assert_eq!(Category::default(), Category::Info);
    }
}
