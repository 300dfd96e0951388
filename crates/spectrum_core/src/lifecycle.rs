//! Bookkeeping resources shared by the tick and event schedulers.

use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::prelude::Resource;

use crate::allocation::AdmissionDecision;
use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::request::RequestId;

/// Current time of the tick scheduler.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct TickClock {
    pub now: u64,
}

/// Index of the next request the tick scheduler has not delivered yet.
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct ArrivalCursor(pub usize);

/// Manual requests waiting for human review, keyed by (process time, request).
#[derive(Debug, Clone, Default, Resource)]
pub struct PendingManual {
    entries: BTreeMap<(u64, RequestId), u64>,
}

impl PendingManual {
    pub fn push(&mut self, process_at: u64, request: RequestId, delay: u64) {
        self.entries.insert((process_at, request), delay);
    }

    /// Removes one entry, returning its review delay.
    pub fn take(&mut self, process_at: u64, request: RequestId) -> Option<u64> {
        self.entries.remove(&(process_at, request))
    }

    /// Removes every entry due at or before `now`, in process-time then arrival order.
    pub fn drain_due(&mut self, now: u64) -> Vec<(RequestId, u64)> {
        let later = self.entries.split_off(&(now + 1, RequestId(0)));
        let due = std::mem::replace(&mut self.entries, later);
        due.into_iter().map(|((_, id), delay)| (id, delay)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Instants that already have a `Renewal` event queued.
#[derive(Debug, Clone, Default, Resource)]
pub struct RenewalCalendar {
    scheduled: BTreeSet<u64>,
}

impl RenewalCalendar {
    /// Queues a renewal pass at `at` unless one is already queued or `at` is past the horizon.
    pub fn ensure(&mut self, clock: &mut SimulationClock, at: u64, horizon: u64) -> bool {
        if at >= horizon || !self.scheduled.insert(at) {
            return false;
        }
        clock.schedule_at(at, EventKind::Renewal, None);
        true
    }

    pub fn complete(&mut self, at: u64) {
        self.scheduled.remove(&at);
    }

    pub fn is_scheduled(&self, at: u64) -> bool {
        self.scheduled.contains(&at)
    }
}

/// Queues the renewal and expiry events a fresh grant needs.
pub fn schedule_grant_follow_ups(
    decision: &AdmissionDecision,
    clock: &mut SimulationClock,
    calendar: &mut RenewalCalendar,
    horizon: u64,
) {
    let AdmissionDecision::Granted {
        assignment,
        next_check,
        expires_at,
        ..
    } = decision
    else {
        return;
    };
    if let Some(at) = next_check {
        calendar.ensure(clock, *at, horizon);
    }
    if let Some(at) = expires_at.filter(|t| *t < horizon) {
        clock.schedule_at(at, EventKind::Expiry, Some(EventSubject::Assignment(*assignment)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_due_keeps_future_entries() {
        let mut pending = PendingManual::default();
        pending.push(100, RequestId(2), 50);
        pending.push(100, RequestId(1), 60);
        pending.push(101, RequestId(0), 70);
        let due = pending.drain_due(100);
        assert_eq!(due, vec![(RequestId(1), 60), (RequestId(2), 50)]);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.take(101, RequestId(0)), Some(70));
        assert!(pending.is_empty());
    }

    #[test]
    fn calendar_deduplicates_and_respects_horizon() {
        let mut clock = SimulationClock::default();
        let mut calendar = RenewalCalendar::default();
        assert!(calendar.ensure(&mut clock, 10, 100));
        assert!(!calendar.ensure(&mut clock, 10, 100));
        assert!(!calendar.ensure(&mut clock, 100, 100));
        assert_eq!(clock.len(), 1);
        calendar.complete(10);
        assert!(!calendar.is_scheduled(10));
    }
}
