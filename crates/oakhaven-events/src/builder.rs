//! Builder for constructing [`Event`] values with optional fields.

use oakhaven_types::{Event, EventId, EventType, Position, ResidentId, StructureId};

/// Builder for an [`Event`] record.
///
/// # Examples
///
/// ```
/// use oakhaven_events::EventBuilder;
/// use oakhaven_types::{EventType, ResidentId};
///
/// let event = EventBuilder::new(100, EventType::Forage)
///     .resident(ResidentId::new())
///     .details(serde_json::json!({ "node": "berry_bush" }))
///     .build();
/// assert_eq!(event.event_type, EventType::Forage);
/// ```
#[derive(Debug)]
pub struct EventBuilder {
    world_seconds: u64,
    event_type: EventType,
    resident_id: Option<ResidentId>,
    target_id: Option<ResidentId>,
    building_id: Option<StructureId>,
    position: Option<Position>,
    details: serde_json::Value,
}

impl EventBuilder {
    /// Start building an event at the given world-seconds timestamp.
    #[must_use]
    pub const fn new(world_seconds: u64, event_type: EventType) -> Self {
        Self {
            world_seconds,
            event_type,
            resident_id: None,
            target_id: None,
            building_id: None,
            position: None,
            details: serde_json::Value::Null,
        }
    }

    /// Set the primary resident involved.
    #[must_use]
    pub const fn resident(mut self, resident_id: ResidentId) -> Self {
        self.resident_id = Some(resident_id);
        self
    }

    /// Set the secondary resident (target) involved.
    #[must_use]
    pub const fn target(mut self, target_id: ResidentId) -> Self {
        self.target_id = Some(target_id);
        self
    }

    /// Set the building involved.
    #[must_use]
    pub const fn building(mut self, building_id: StructureId) -> Self {
        self.building_id = Some(building_id);
        self
    }

    /// Set the position where the event occurred.
    #[must_use]
    pub const fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the opaque structured payload.
    #[must_use]
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Produce the [`Event`]. The id is minted here using UUID v7, so the
    /// log's insertion order and id order always agree.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: EventId::new(),
            world_seconds: self.world_seconds,
            event_type: self.event_type,
            resident_id: self.resident_id,
            target_id: self.target_id,
            building_id: self.building_id,
            position: self.position,
            details: self.details,
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_requested_fields() {
        let resident = ResidentId::new();
        let event = EventBuilder::new(42, EventType::Arrival)
            .resident(resident)
            .build();
        assert_eq!(event.world_seconds, 42);
        assert_eq!(event.resident_id, Some(resident));
        assert!(event.target_id.is_none());
    }
}
