// SPDX-License-Identifier: MPL-2.0
//! The eviction loop.
//!
//! Retires notices strictly head-first once their display lifetime has
//! elapsed. Removal goes through the dispatcher's animation: the slot is
//! freed only after the completion signal resolves (or the optional bound
//! expires), so at most one removal animation is ever in flight.

use super::{lock, Shared};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, warn};

pub(crate) async fn run(shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
    loop {
        // The head notice; suspend while the active set is empty. Only this
        // loop removes items, so the head stays valid once observed.
        let head = loop {
            let activated = shared.activated.notified();
            if let Some(notice) = lock(&shared.active).front().cloned() {
                break notice;
            }
            tokio::select! {
                () = activated => {}
                _ = shutdown.changed() => return,
            }
        };

        tokio::select! {
            () = time::sleep_until(head.deadline(shared.lifetime)) => {}
            _ = shutdown.changed() => return,
        }

        let animation = shared.dispatcher.animate_removal(&head);
        match shared.removal_timeout {
            Some(bound) => {
                tokio::select! {
                    finished = time::timeout(bound, animation) => {
                        if finished.is_err() {
                            warn!(
                                id = head.id().value(),
                                timeout_ms = bound.as_millis() as u64,
                                "removal animation did not complete, force-evicting"
                            );
                        }
                    }
                    _ = shutdown.changed() => return,
                }
            }
            None => {
                tokio::select! {
                    () = animation => {}
                    _ = shutdown.changed() => return,
                }
            }
        }

        let snapshot = {
            let mut active = lock(&shared.active);
            active.pop_front();
            active.snapshot()
        };
        debug!(id = head.id().value(), remaining = snapshot.len(), "notice evicted");
        shared.dispatcher.render(&snapshot);
        shared.slot_freed.notify_one();
    }
}
