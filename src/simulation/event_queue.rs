//! Virtual-time event queue with deterministic ordering.

use std::cmp::Ordering;
use std::time::Duration;

use crate::simulation::repair::RepairTicket;

/// Timer events handled by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    /// Main tick timer fired
    Tick,
    /// Repair delay elapsed for a ticket
    RepairComplete(RepairTicket),
}

/// Key for ordering events in the queue.
///
/// Events are ordered by:
/// 1. Time (earlier first)
/// 2. Sequence number (FIFO for events due at the same time)
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EventKey {
    /// When this event should be processed.
    pub time: Duration,
    /// Sequence number for deterministic FIFO ordering.
    pub sequence: u64,
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => {}
            ord => return ord,
        }

        self.sequence.cmp(&other.sequence)
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_key_ordering() {
        let earlier = EventKey {
            time: Duration::from_millis(1500),
            sequence: 7,
        };
        let later = EventKey {
            time: Duration::from_millis(2000),
            sequence: 1,
        };
        assert!(earlier < later);
    }

    #[test]
    fn test_fifo_at_same_time() {
        let first = EventKey {
            time: Duration::from_secs(2),
            sequence: 1,
        };
        let second = EventKey {
            time: Duration::from_secs(2),
            sequence: 2,
        };
        assert!(first < second, "Earlier-scheduled events should process first");
    }
}
