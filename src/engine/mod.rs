// SPDX-License-Identifier: MPL-2.0
//! The notice scheduling engine.
//!
//! A [`NoticeEngine`] owns two dedicated tasks — the throttled scheduler
//! and the eviction loop — plus the structures they coordinate through:
//!
//! - `ingest`: producer-facing FIFO awaiting activation
//! - `reservations`: deferred notices keyed by a counter threshold
//! - `active`: the bounded, insertion-ordered display set
//! - `scheduler`: drains the queue into the active set, one notice per
//!   `min_gap`, only when a slot is free
//! - `eviction`: retires expired notices head-first through the
//!   dispatcher's removal animation
//!
//! Producers interact through a cloneable [`NoticeHandle`]; all handle
//! operations are synchronous, non-blocking, and safe from any thread.

mod active;
mod eviction;
mod ingest;
mod reservations;
mod scheduler;

pub use reservations::CorrelationKey;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::notice::{Category, Notice};
use active::ActiveSet;
use ingest::IngestQueue;
use reservations::{Reservation, ReservationStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::debug;

/// Recovers the guard from a poisoned lock. Engine state stays consistent
/// under poisoning because every critical section is a short, panic-free
/// mutation.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the handle and the two loops.
pub(crate) struct Shared {
    pub(crate) min_gap: Duration,
    pub(crate) lifetime: Duration,
    pub(crate) removal_timeout: Option<Duration>,
    /// Mutated only by the scheduler (append) and eviction loop (head pop).
    pub(crate) active: Mutex<ActiveSet>,
    pub(crate) ingest: IngestQueue,
    pub(crate) reservations: ReservationStore,
    /// Scheduler -> eviction loop: a notice was appended.
    pub(crate) activated: Notify,
    /// Eviction loop -> scheduler: a slot was freed.
    pub(crate) slot_freed: Notify,
    pub(crate) dispatcher: Arc<dyn Dispatcher>,
}

/// A running scheduling engine.
///
/// Construction spawns the scheduler and eviction tasks onto the current
/// tokio runtime; [`shutdown`](NoticeEngine::shutdown) stops both. Producers
/// get a [`NoticeHandle`] via [`handle`](NoticeEngine::handle).
pub struct NoticeEngine {
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    scheduler: JoinHandle<()>,
    eviction: JoinHandle<()>,
}

impl NoticeEngine {
    /// Validates the configuration and starts the engine.
    ///
    /// Must be called from within a tokio runtime context.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration fails validation.
    pub fn new(config: Config, dispatcher: Arc<dyn Dispatcher>) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            min_gap: config.min_gap(),
            lifetime: config.lifetime(),
            removal_timeout: config.removal_timeout(),
            active: Mutex::new(ActiveSet::new(config.capacity())),
            ingest: IngestQueue::new(config.max_queued, config.overflow),
            reservations: ReservationStore::new(),
            activated: Notify::new(),
            slot_freed: Notify::new(),
            dispatcher,
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = tokio::spawn(scheduler::run(Arc::clone(&shared), shutdown_rx.clone()));
        let eviction = tokio::spawn(eviction::run(Arc::clone(&shared), shutdown_rx));

        Ok(Self {
            shared,
            shutdown_tx,
            scheduler,
            eviction,
        })
    }

    /// Returns a cheaply-cloneable producer handle.
    #[must_use]
    pub fn handle(&self) -> NoticeHandle {
        NoticeHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Signals both loops to stop and waits for them to finish.
    ///
    /// Queued and active notices are discarded; handles left alive keep
    /// accepting pushes, which then go nowhere.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.scheduler.await;
        let _ = self.eviction.await;
    }
}

/// Producer facade over a running [`NoticeEngine`].
///
/// Cheap to clone and safe to share across threads. All methods are
/// synchronous and non-blocking.
#[derive(Clone)]
pub struct NoticeHandle {
    shared: Arc<Shared>,
}

impl NoticeHandle {
    /// Enqueues a notice for immediate (throttled) display.
    pub fn push(&self, category: Category, message: impl Into<String>) {
        self.shared.ingest.enqueue(Notice::new(category, message));
    }

    /// Records a deferred notice, displayed once the external counter
    /// reaches `trigger_threshold`.
    ///
    /// Reserving again with the same key replaces the pending reservation
    /// in place.
    pub fn reserve(
        &self,
        category: Category,
        message: impl Into<String>,
        trigger_threshold: u64,
        key: CorrelationKey,
    ) {
        self.shared.reservations.reserve(Reservation {
            category,
            message: message.into(),
            trigger_threshold,
            key,
        });
    }

    /// Removes the pending reservation with the given key.
    ///
    /// Returns whether one was removed. A no-op returning `false` for
    /// unknown or already matured keys.
    pub fn cancel_reserve(&self, key: CorrelationKey) -> bool {
        self.shared.reservations.cancel(key)
    }

    /// Feeds an observed value of the external monotonic counter.
    ///
    /// Every pending reservation whose threshold the counter has reached is
    /// promoted into the ingest queue, in the order the reservations were
    /// stored. Safe to call from the counter collaborator's own thread.
    pub fn on_counter_advanced(&self, counter: u64) {
        for matured in self.shared.reservations.mature(counter) {
            debug!(
                key = %matured.key,
                threshold = matured.trigger_threshold,
                counter,
                "reservation matured"
            );
            self.shared
                .ingest
                .enqueue(Notice::new(matured.category, matured.message));
        }
    }

    /// An ordered copy of the currently displayed notices.
    #[must_use]
    pub fn active_snapshot(&self) -> Vec<Notice> {
        lock(&self.shared.active).snapshot()
    }

    /// Number of currently displayed notices.
    #[must_use]
    pub fn active_count(&self) -> usize {
        lock(&self.shared.active).len()
    }

    /// Number of notices awaiting activation.
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.shared.ingest.len()
    }

    /// Number of pending reservations.
    #[must_use]
    pub fn reserved_count(&self) -> usize {
        self.shared.reservations.len()
    }
}
