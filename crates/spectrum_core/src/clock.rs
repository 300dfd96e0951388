use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

use crate::assignment::AssignmentId;
use crate::request::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// A request reaches the system.
    Arrival,
    /// A manual request's human review completes.
    ProcessManual,
    /// Renewal pass for assignments whose next check is due now.
    Renewal,
    /// An assignment's lease ends.
    Expiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSubject {
    Request(RequestId),
    Assignment(AssignmentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
    /// Insertion order; breaks ties between events at the same instant.
    pub seq: u64,
}

impl Event {
    pub fn request(&self) -> Option<RequestId> {
        match self.subject {
            Some(EventSubject::Request(id)) => Some(id),
            _ => None,
        }
    }

    pub fn assignment(&self) -> Option<AssignmentId> {
        match self.subject {
            Some(EventSubject::Assignment(id)) => Some(id),
            _ => None,
        }
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(
        &mut self,
        timestamp: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Event {
        debug_assert!(timestamp >= self.now, "event timestamp must be >= current time");
        let event = Event {
            timestamp,
            kind,
            subject,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.events.push(event);
        event
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|e| e.timestamp)
    }

    /// Moves time forward without an event, used to flush up to the horizon.
    pub fn advance_to(&mut self, timestamp: u64) {
        debug_assert!(timestamp >= self.now, "clock cannot move backwards");
        self.now = self.now.max(timestamp);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Event being dispatched by the runner.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);
