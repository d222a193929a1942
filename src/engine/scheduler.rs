// SPDX-License-Identifier: MPL-2.0
//! The throttled scheduler loop.
//!
//! Single consumer of the ingest queue. Each cycle waits out the
//! inter-activation gap, waits for a free slot in the active set, then
//! activates exactly one notice. Throttling is a deliberate backpressure
//! policy: a burst of N notices is smoothed to arrive over at least
//! `(N - 1) * min_gap`.

use super::{lock, Shared};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::debug;

pub(crate) async fn run(shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
    let mut last_activation: Option<Instant> = None;

    loop {
        // Gap since the previous activation.
        if let Some(last) = last_activation {
            tokio::select! {
                () = time::sleep_until(last + shared.min_gap) => {}
                _ = shutdown.changed() => return,
            }
        }

        // A free slot in the active set. The notified future is created
        // before the capacity check so an eviction in between is not missed.
        loop {
            let slot_freed = shared.slot_freed.notified();
            if lock(&shared.active).has_capacity() {
                break;
            }
            tokio::select! {
                () = slot_freed => {}
                _ = shutdown.changed() => return,
            }
        }

        // The oldest queued notice; suspend while the queue is empty.
        let mut notice = loop {
            let ready = shared.ingest.ready();
            if let Some(notice) = shared.ingest.drain() {
                break notice;
            }
            tokio::select! {
                () = ready => {}
                _ = shutdown.changed() => return,
            }
        };

        let now = Instant::now();
        notice.mark_activated(now);
        debug!(
            id = notice.id().value(),
            queued = shared.ingest.len(),
            "notice activated"
        );

        let snapshot = {
            let mut active = lock(&shared.active);
            active.push(notice);
            active.snapshot()
        };
        shared.dispatcher.render(&snapshot);

        last_activation = Some(now);
        shared.activated.notify_one();
    }
}
