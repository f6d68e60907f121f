// EventRing - fixed-capacity, overwrite-oldest event store
//
// Owns event-ID assignment: every inserted event receives the next ID from a
// monotonic counter starting at 1. Insertion always succeeds; once the ring
// is full the oldest event is evicted to make room. There is no backpressure
// or rejection path.
//
// The ring itself is not synchronized; the detector wraps it (together with
// the statistics) in a single mutex so ID assignment order matches lock
// acquisition order.

use std::collections::VecDeque;

use crate::event::{EmergenceEvent, EventId};

/// Fixed-capacity circular event store with ID assignment.
#[derive(Debug)]
pub struct EventRing {
    events: VecDeque<EmergenceEvent>,
    capacity: usize,
    next_id: EventId,
}

impl EventRing {
    /// Create a ring holding at most `capacity` events.
    ///
    /// # Panics
    /// Panics if `capacity` is 0: the engine cannot operate without its
    /// buffer.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "event ring capacity must be greater than 0");
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Insert `event`, assigning it the next ID.
    ///
    /// Evicts the oldest event when the ring is full. Returns the assigned
    /// ID; the caller's `event.id` field is overwritten.
    pub fn insert(&mut self, mut event: EmergenceEvent) -> EventId {
        let id = self.next_id;
        self.next_id += 1;
        event.id = id;

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
        id
    }

    /// The most recently inserted event.
    pub fn latest(&self) -> Option<&EmergenceEvent> {
        self.events.back()
    }

    /// Mutable access to the most recently inserted event.
    pub fn latest_mut(&mut self) -> Option<&mut EmergenceEvent> {
        self.events.back_mut()
    }

    /// Find an event by ID, scanning newest to oldest.
    ///
    /// Returns `None` for unknown IDs and for events already evicted.
    pub fn find(&self, id: EventId) -> Option<&EmergenceEvent> {
        if id == 0 {
            return None;
        }
        self.events.iter().rev().find(|event| event.id == id)
    }

    /// Mutable variant of [`EventRing::find`].
    pub fn find_mut(&mut self, id: EventId) -> Option<&mut EmergenceEvent> {
        if id == 0 {
            return None;
        }
        self.events.iter_mut().rev().find(|event| event.id == id)
    }

    /// Number of events currently stored.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of stored events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
