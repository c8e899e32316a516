//! Ordered set of delayed events
//!
//! Events are ordered by due time, then priority (lower first), then
//! insertion sequence, so equal keys are served first-scheduled-first-served.

use futures::future::BoxFuture;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tokio::time::Instant;

/// Future returned by an event action
pub type ActionFuture = BoxFuture<'static, crate::error::Result<()>>;

/// Zero-argument callable run when an event becomes due
pub type Action = Box<dyn FnOnce() -> ActionFuture + Send>;

// ============================================================================
// Scheduled Event
// ============================================================================

/// A single pending event
pub struct ScheduledEvent {
    /// Earliest instant the event may fire
    pub due: Instant,

    /// Secondary ordering key (lower runs first)
    pub priority: i32,

    /// Insertion sequence number
    pub seq: u64,

    /// Label used in logs and errors
    pub label: String,

    action: Action,
}

impl ScheduledEvent {
    fn key(&self) -> (Instant, i32, u64) {
        (self.due, self.priority, self.seq)
    }

    /// Consume the event and start its action
    pub fn fire(self) -> ActionFuture {
        (self.action)()
    }
}

impl std::fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("due", &self.due)
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Min-ordered queue of scheduled events
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, returning its sequence number
    pub fn push(&mut self, due: Instant, priority: i32, label: String, action: Action) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(ScheduledEvent {
            due,
            priority,
            seq,
            label,
            action,
        }));
        seq
    }

    /// Due time of the earliest event
    pub fn next_due(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(event)| event.due)
    }

    /// Remove the earliest event if it is due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<ScheduledEvent> {
        match self.heap.peek() {
            Some(Reverse(event)) if event.due <= now => self.heap.pop().map(|Reverse(e)| e),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::time::Duration;

    fn noop() -> Action {
        Box::new(|| async { Ok(()) }.boxed())
    }

    fn drain(queue: &mut EventQueue, now: Instant) -> Vec<String> {
        let mut labels = Vec::new();
        while let Some(event) = queue.pop_due(now) {
            labels.push(event.label.clone());
        }
        labels
    }

    #[test]
    fn test_orders_by_due_time() {
        let base = Instant::now();
        let mut queue = EventQueue::new();
        queue.push(base + Duration::from_secs(3), 1, "c".into(), noop());
        queue.push(base + Duration::from_secs(1), 1, "a".into(), noop());
        queue.push(base + Duration::from_secs(2), 1, "b".into(), noop());

        assert_eq!(queue.next_due(), Some(base + Duration::from_secs(1)));
        assert_eq!(drain(&mut queue, base + Duration::from_secs(5)), ["a", "b", "c"]);
    }

    #[test]
    fn test_priority_breaks_time_ties() {
        let due = Instant::now();
        let mut queue = EventQueue::new();
        queue.push(due, 5, "low".into(), noop());
        queue.push(due, 1, "high".into(), noop());

        assert_eq!(drain(&mut queue, due), ["high", "low"]);
    }

    #[test]
    fn test_insertion_order_breaks_full_ties() {
        let due = Instant::now();
        let mut queue = EventQueue::new();
        for label in ["first", "second", "third"] {
            queue.push(due, 1, label.into(), noop());
        }

        assert_eq!(drain(&mut queue, due), ["first", "second", "third"]);
    }

    #[test]
    fn test_pop_due_respects_time() {
        let base = Instant::now();
        let mut queue = EventQueue::new();
        queue.push(base + Duration::from_secs(10), 1, "later".into(), noop());

        assert!(queue.pop_due(base).is_none());
        assert_eq!(queue.len(), 1);
        assert!(queue.pop_due(base + Duration::from_secs(10)).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let now = Instant::now();
        let mut queue = EventQueue::new();
        let a = queue.push(now, 1, "a".into(), noop());
        let b = queue.push(now, 1, "b".into(), noop());
        assert!(b > a);
    }
}
