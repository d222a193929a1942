// SPDX-License-Identifier: MPL-2.0
//! Deferred notices keyed by a trigger threshold and a cancellation key.
//!
//! A reservation is held until the external monotonic counter reaches its
//! threshold (maturation) or it is cancelled, whichever comes first. The
//! comparison is level-triggered: a reservation matures the first time the
//! observed counter is at or past its threshold, however far the counter
//! has advanced since.

use super::lock;
use crate::notice::Category;
use std::fmt;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Opaque identifier tying a reservation to the event that may cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationKey(Uuid);

impl CorrelationKey {
    /// Creates a fresh random key.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationKey {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CorrelationKey {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A notice whose admission is deferred until the counter reaches
/// `trigger_threshold`.
#[derive(Debug, Clone)]
pub(crate) struct Reservation {
    pub(crate) category: Category,
    pub(crate) message: String,
    pub(crate) trigger_threshold: u64,
    pub(crate) key: CorrelationKey,
}

/// Holds pending reservations in the order they were stored.
///
/// At most one live reservation exists per correlation key: reserving with
/// a duplicate key replaces the pending entry in place, keeping its
/// position in the maturation order.
pub(crate) struct ReservationStore {
    items: Mutex<Vec<Reservation>>,
}

impl ReservationStore {
    pub(crate) fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Records a reservation, replacing any pending one with the same key.
    pub(crate) fn reserve(&self, reservation: Reservation) {
        let mut items = lock(&self.items);
        if let Some(existing) = items.iter_mut().find(|r| r.key == reservation.key) {
            debug!(key = %reservation.key, "replacing pending reservation");
            *existing = reservation;
        } else {
            items.push(reservation);
        }
    }

    /// Removes the pending reservation with the given key.
    ///
    /// Returns whether one was removed; a no-op for unknown or already
    /// matured keys.
    pub(crate) fn cancel(&self, key: CorrelationKey) -> bool {
        let mut items = lock(&self.items);
        match items.iter().position(|r| r.key == key) {
            Some(pos) => {
                items.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Removes and returns every reservation whose threshold the counter
    /// has reached, in the order they were originally stored.
    pub(crate) fn mature(&self, counter: u64) -> Vec<Reservation> {
        let mut items = lock(&self.items);
        let mut matured = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if items[i].trigger_threshold <= counter {
                matured.push(items.remove(i));
            } else {
                i += 1;
            }
        }
        matured
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.items).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(message: &str, threshold: u64, key: CorrelationKey) -> Reservation {
        Reservation {
            category: Category::Info,
            message: message.to_string(),
            trigger_threshold: threshold,
            key,
        }
    }

    #[test]
    fn matures_at_or_past_threshold_only() {
        let store = ReservationStore::new();
        store.reserve(reservation("quest done", 100, CorrelationKey::new()));

        assert!(store.mature(99).is_empty());
        assert_eq!(store.len(), 1);

        let matured = store.mature(100);
        assert_eq!(matured.len(), 1);
        assert_eq!(matured[0].message, "quest done");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn each_reservation_matures_at_most_once() {
        let store = ReservationStore::new();
        store.reserve(reservation("once", 10, CorrelationKey::new()));

        assert_eq!(store.mature(50).len(), 1);
        assert!(store.mature(60).is_empty());
    }

    #[test]
    fn maturation_preserves_stored_order() {
        let store = ReservationStore::new();
        store.reserve(reservation("a", 30, CorrelationKey::new()));
        store.reserve(reservation("b", 10, CorrelationKey::new()));
        store.reserve(reservation("c", 20, CorrelationKey::new()));

        // All three mature in the same call; order is store order, not
        // threshold order.
        let matured = store.mature(100);
        let messages: Vec<&str> = matured.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn partial_maturation_keeps_later_thresholds() {
        let store = ReservationStore::new();
        store.reserve(reservation("soon", 10, CorrelationKey::new()));
        store.reserve(reservation("later", 200, CorrelationKey::new()));

        let matured = store.mature(50);
        assert_eq!(matured.len(), 1);
        assert_eq!(matured[0].message, "soon");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cancel_is_idempotent() {
        let store = ReservationStore::new();
        let key = CorrelationKey::new();
        store.reserve(reservation("pending", 100, key));

        assert!(store.cancel(key));
        assert!(!store.cancel(key));
    }

    #[test]
    fn cancel_unknown_key_returns_false() {
        let store = ReservationStore::new();
        assert!(!store.cancel(CorrelationKey::new()));
    }

    #[test]
    fn cancelled_reservation_never_matures() {
        let store = ReservationStore::new();
        let key = CorrelationKey::new();
        store.reserve(reservation("doomed", 100, key));

        assert!(store.cancel(key));
        assert!(store.mature(150).is_empty());
    }

    #[test]
    fn replaces_pending_reservation_with_same_key() {
        let store = ReservationStore::new();
        let key = CorrelationKey::new();
        store.reserve(reservation("first", 50, CorrelationKey::new()));
        store.reserve(reservation("old", 100, key));
        store.reserve(reservation("new", 80, key));

        assert_eq!(store.len(), 2);

        // The replacement kept the original store position.
        let matured = store.mature(100);
        let messages: Vec<&str> = matured.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "new"]);
    }

    #[test]
    fn cancel_after_replacement_removes_the_new_entry() {
        let store = ReservationStore::new();
        let key = CorrelationKey::new();
        store.reserve(reservation("old", 100, key));
        store.reserve(reservation("new", 80, key));

        assert!(store.cancel(key));
        assert_eq!(store.len(), 0);
        assert!(!store.cancel(key));
    }
}
