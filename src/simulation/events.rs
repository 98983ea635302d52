//! Simulation events
//!
//! Events are what the rendering layer shows as status text. The
//! simulator keeps the most recent one for display and a bounded
//! history tagged with the tick it happened on.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Default number of events kept in the history
pub const DEFAULT_EVENT_HISTORY: usize = 100;

/// How a challenge was verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerificationMode {
    /// Threshold signature scheme
    Tss,
    /// Direct check against the node
    DirectCheck,
}

impl VerificationMode {
    pub fn from_integrity_checks(enabled: bool) -> Self {
        if enabled {
            VerificationMode::Tss
        } else {
            VerificationMode::DirectCheck
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerificationMode::Tss => "TSS",
            VerificationMode::DirectCheck => "Direct Check",
        }
    }
}

/// Something that happened during the simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimEvent {
    NodeFailed { node_id: usize },
    RepairStarted { node_id: usize },
    RepairCompleted { node_id: usize },
    Challenge { mode: VerificationMode, anchored: bool },
    Reset,
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::NodeFailed { node_id } => write!(f, "Node {} failed!", node_id),
            SimEvent::RepairStarted { node_id } => {
                write!(f, "Initiating self-repair on Node {}...", node_id)
            }
            SimEvent::RepairCompleted { node_id } => {
                write!(f, "Redundancy restored on Node {}.", node_id)
            }
            SimEvent::Challenge { mode, anchored } => {
                write!(f, "Integrity challenge issued ({})", mode.label())?;
                if *anchored {
                    f.write_str(", proof anchored")?;
                }
                Ok(())
            }
            SimEvent::Reset => f.write_str("Simulation reset."),
        }
    }
}

/// Event together with the tick it was emitted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub tick: u64,
    pub event: SimEvent,
}

/// Bounded event history with a last-write-wins display slot
#[derive(Debug, Clone)]
pub struct EventLog {
    history: VecDeque<EventRecord>,
    max_history: usize,
    last: Option<SimEvent>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_HISTORY)
    }
}

impl EventLog {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history,
            last: None,
        }
    }

    /// Record an event; it also replaces the displayed message
    pub fn push(&mut self, tick: u64, event: SimEvent) {
        self.last = Some(event.clone());
        self.history.push_back(EventRecord { tick, event });
        if self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// The message currently on display
    pub fn last(&self) -> Option<&SimEvent> {
        self.last.as_ref()
    }

    pub fn history(&self) -> &VecDeque<EventRecord> {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_messages() {
        assert_eq!(SimEvent::NodeFailed { node_id: 3 }.to_string(), "Node 3 failed!");
        assert_eq!(
            SimEvent::RepairStarted { node_id: 3 }.to_string(),
            "Initiating self-repair on Node 3..."
        );
        assert_eq!(
            SimEvent::RepairCompleted { node_id: 3 }.to_string(),
            "Redundancy restored on Node 3."
        );
        let challenge = SimEvent::Challenge {
            mode: VerificationMode::Tss,
            anchored: false,
        };
        assert!(challenge.to_string().contains("TSS"));
        let challenge = SimEvent::Challenge {
            mode: VerificationMode::DirectCheck,
            anchored: true,
        };
        assert!(challenge.to_string().contains("Direct Check"));
    }

    #[test]
    fn test_last_write_wins() {
        let mut log = EventLog::default();
        log.push(0, SimEvent::NodeFailed { node_id: 1 });
        log.push(0, SimEvent::RepairStarted { node_id: 1 });
        assert_eq!(log.last(), Some(&SimEvent::RepairStarted { node_id: 1 }));
        assert_eq!(log.history().len(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.push(i, SimEvent::NodeFailed { node_id: i as usize });
        }
        assert_eq!(log.history().len(), 3);
        assert_eq!(log.history().front().map(|r| r.tick), Some(2));

        log.clear();
        assert!(log.last().is_none());
        assert!(log.history().is_empty());
    }
}
