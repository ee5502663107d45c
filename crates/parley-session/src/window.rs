//! Bounded sliding window of conversation turns.

use std::collections::VecDeque;

use parley_engine::Segment;

/// Segments retained per conversation (two query/reply exchanges).
pub const WINDOW_CAPACITY: usize = 4;

/// The most recent turns of one conversation, oldest first.
///
/// Invariant: never holds more than [`WINDOW_CAPACITY`] segments. Appending is
/// the only mutation; segments leave only through eviction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationWindow {
    segments: VecDeque<Segment>,
}

impl ConversationWindow {
    pub fn new() -> Self {
        Self {
            segments: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    /// Append a segment, returning the evicted oldest one if the window was full.
    pub fn append(&mut self, segment: Segment) -> Option<Segment> {
        let evicted = if self.segments.len() == WINDOW_CAPACITY {
            self.segments.pop_front()
        } else {
            None
        };
        self.segments.push_back(segment);
        evicted
    }

    /// All held segments joined in insertion order, or `None` when empty.
    pub fn concat(&self) -> Option<Segment> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Segment::concat(&self.segments))
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }
}
