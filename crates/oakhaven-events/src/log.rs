//! The append-only event log.

use oakhaven_types::{Event, EventId, EventType, ResidentId};

/// In-memory append-only log of every [`Event`] recorded this run.
///
/// Ids are monotonically increasing (UUID v7, time-ordered), so
/// insertion order and id order always agree -- the testable property
/// "strictly increasing event ids" holds by construction.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an event, returning a reference to the appended entry.
    pub fn append(&mut self, event: Event) -> &Event {
        self.entries.push(event);
        #[allow(clippy::unwrap_used)]
        self.entries.last().unwrap()
    }

    /// Return the number of events recorded.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return whether the log is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return all events, in insertion (and id) order.
    #[must_use]
    pub fn all(&self) -> &[Event] {
        &self.entries
    }

    /// Return the most recent `limit` events, newest first -- the shape
    /// the activity-feed HTTP contract consumes.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<&Event> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Return every event involving a given resident, as either the
    /// primary actor or the target.
    #[must_use]
    pub fn for_resident(&self, resident_id: ResidentId) -> Vec<&Event> {
        self.entries
            .iter()
            .filter(|e| e.resident_id == Some(resident_id) || e.target_id == Some(resident_id))
            .collect()
    }

    /// Return every event of a given type, in insertion order.
    #[must_use]
    pub fn by_type(&self, event_type: EventType) -> Vec<&Event> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Verify that event ids are strictly increasing in insertion order.
    ///
    /// Exposed for the testable-properties suite; always holds in normal
    /// operation since ids are minted from UUID v7 at append time.
    #[must_use]
    pub fn ids_strictly_increasing(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| id_of(&pair[0]) < id_of(&pair[1]))
    }
}

const fn id_of(event: &Event) -> EventId {
    event.id
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use oakhaven_types::Event;

    use super::*;
    use crate::EventBuilder;

    fn event(world_seconds: u64, event_type: EventType) -> Event {
        EventBuilder::new(world_seconds, event_type).build()
    }

    #[test]
    fn append_increases_len() {
        let mut log = EventLog::new();
        log.append(event(1, EventType::Arrival));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn recent_returns_newest_first() {
        let mut log = EventLog::new();
        log.append(event(1, EventType::Arrival));
        log.append(event(2, EventType::Depart));
        let recent = log.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].event_type, EventType::Depart);
    }

    #[test]
    fn for_resident_matches_actor_or_target() {
        let mut log = EventLog::new();
        let alice = oakhaven_types::ResidentId::new();
        let mut arrest = EventBuilder::new(1, EventType::Arrest).resident(alice).build();
        arrest.target_id = Some(oakhaven_types::ResidentId::new());
        log.append(arrest);
        assert_eq!(log.for_resident(alice).len(), 1);
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut log = EventLog::new();
        for _ in 0..5 {
            log.append(event(1, EventType::Forage));
        }
        assert!(log.ids_strictly_increasing());
    }
}
