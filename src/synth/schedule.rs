use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::sequencing::pitch::Pitch;

/// A note event waiting for its frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    Attack {
        pitch: Pitch,
        velocity: f32,
        note_id: u64,
    },
    /// `note_id` narrows the release to one note; `None` releases whatever
    /// voice is holding `pitch`.
    Release { pitch: Pitch, note_id: Option<u64> },
}

/// Pending events a synth holds before refusing new ones. The transport
/// looks ahead a fraction of a step, so a full grid column (attack plus
/// release per row) several times over still fits.
pub const EVENT_CAPACITY: usize = 256;

/*
Event Queue
===========

Triggers arrive ahead of time (the transport looks ahead ~100 ms) and are
kept here until the render loop reaches their frame:

  frame:   1000        1000        6000        12000
          [Attack a]  [Attack b]  [Release a] [Release b]
                  ↑ insertion order breaks ties

The queue is a min-heap on (frame, seq) with its storage reserved up front.
`push` refuses events once `capacity` are pending instead of growing, so the
audio thread never reallocates here. Both push and pop are O(log n).
*/

#[derive(Debug)]
struct Entry {
    frame: u64,
    seq: u64,
    event: NoteEvent,
}

impl Entry {
    fn key(&self) -> (u64, u64) {
        (self.frame, self.seq)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug)]
pub struct EventQueue {
    events: BinaryHeap<Reverse<Entry>>,
    capacity: usize,
    seq: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(EVENT_CAPACITY)
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: BinaryHeap::with_capacity(capacity),
            capacity,
            seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free places left before `push` starts refusing.
    pub fn remaining(&self) -> usize {
        self.capacity - self.events.len()
    }

    /// Queue `event` for `frame`. Returns false, dropping the event, when
    /// the queue is full.
    pub fn push(&mut self, frame: u64, event: NoteEvent) -> bool {
        if self.events.len() >= self.capacity {
            return false;
        }
        self.events.push(Reverse(Entry {
            frame,
            seq: self.seq,
            event,
        }));
        self.seq = self.seq.wrapping_add(1);
        true
    }

    /// Frame of the earliest pending event.
    pub fn next_frame(&self) -> Option<u64> {
        self.events.peek().map(|Reverse(entry)| entry.frame)
    }

    /// Remove and return the earliest event if it is due at or before
    /// `frame`.
    pub fn pop_due(&mut self, frame: u64) -> Option<NoteEvent> {
        if self.next_frame()? > frame {
            return None;
        }
        self.events.pop().map(|Reverse(entry)| entry.event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attack(note_id: u64) -> NoteEvent {
        NoteEvent::Attack {
            pitch: Pitch::C4,
            velocity: 1.0,
            note_id,
        }
    }

    #[test]
    fn orders_by_frame_then_insertion() {
        let mut queue = EventQueue::new();
        queue.push(500, attack(1));
        queue.push(100, attack(2));
        queue.push(500, attack(3));
        queue.push(100, attack(4));

        let mut order = Vec::new();
        while let Some(NoteEvent::Attack { note_id, .. }) = queue.pop_due(u64::MAX) {
            order.push(note_id);
        }
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn nothing_is_due_early() {
        let mut queue = EventQueue::new();
        queue.push(480, attack(1));
        assert_eq!(queue.pop_due(479), None);
        assert_eq!(queue.next_frame(), Some(480));
        assert!(queue.pop_due(480).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_refuses_without_growing() {
        let mut queue = EventQueue::with_capacity(2);
        assert!(queue.push(10, attack(1)));
        assert!(queue.push(5, attack(2)));
        assert_eq!(queue.remaining(), 0);

        assert!(!queue.push(1, attack(3)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.next_frame(), Some(5));

        queue.pop_due(5);
        assert!(queue.push(1, attack(3)));
    }
}
