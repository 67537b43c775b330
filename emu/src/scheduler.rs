//! Global cycle clock shared by the CPU and the rest of the machine.
//!
//! Time only moves forward through [`Scheduler::run`]. Events are due at an
//! absolute cycle and are handed back by [`Scheduler::pop_due`] once the clock
//! has reached them; the CPU drains them between instructions, so nothing
//! observes time in the middle of an instruction.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The interrupt line has been asserted long enough to be seen by the CPU.
    InterruptDelay,
    /// Event owned by a bus-side device, forwarded to `Bus::on_event`.
    External(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Event {
    pub time: u64,
    pub kind: EventKind,
}

#[derive(Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: u64,
    events: BinaryHeap<Reverse<Event>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Absolute time of the earliest pending event, `u64::MAX` when there is none.
    #[must_use]
    pub fn next(&self) -> u64 {
        self.events.peek().map_or(u64::MAX, |Reverse(event)| event.time)
    }

    /// Advances the clock by `cycles`.
    #[inline]
    pub const fn run(&mut self, cycles: u64) {
        self.now += cycles;
    }

    /// Queues `kind` to fire `delay` cycles from now.
    pub fn schedule(&mut self, kind: EventKind, delay: u64) {
        self.events.push(Reverse(Event {
            time: self.now + delay,
            kind,
        }));
    }

    /// Drops every pending event of the given kind.
    pub fn cancel(&mut self, kind: EventKind) {
        self.events.retain(|Reverse(event)| event.kind != kind);
    }

    #[must_use]
    pub fn is_scheduled(&self, kind: EventKind) -> bool {
        self.events.iter().any(|Reverse(event)| event.kind == kind)
    }

    /// Removes and returns the earliest event whose time has been reached.
    pub fn pop_due(&mut self) -> Option<Event> {
        if self.next() > self.now {
            return None;
        }
        self.events.pop().map(|Reverse(event)| event)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn events_fire_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(EventKind::External(2), 10);
        scheduler.schedule(EventKind::External(1), 4);

        assert_eq!(scheduler.next(), 4);
        scheduler.run(3);
        assert_eq!(scheduler.pop_due(), None);

        scheduler.run(8);
        assert_eq!(scheduler.now(), 11);
        assert_eq!(
            scheduler.pop_due(),
            Some(Event {
                time: 4,
                kind: EventKind::External(1)
            })
        );
        assert_eq!(scheduler.pop_due().map(|e| e.kind), Some(EventKind::External(2)));
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.next(), u64::MAX);
    }

    #[test]
    fn cancel() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(EventKind::InterruptDelay, 3);
        scheduler.schedule(EventKind::External(0), 5);

        assert!(scheduler.is_scheduled(EventKind::InterruptDelay));
        scheduler.cancel(EventKind::InterruptDelay);

        assert!(!scheduler.is_scheduled(EventKind::InterruptDelay));
        assert_eq!(scheduler.next(), 5);
    }
}
