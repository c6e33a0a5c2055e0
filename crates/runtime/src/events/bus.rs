//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use combat_core::{CombatEvent, LocationId};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Combat begun or ended, combatants joining and leaving.
    Session,
    /// Initiative, rounds, turn starts and skips, forfeits.
    Turn,
    /// Maneuvers, rolls, damage, status effects and resource spends.
    Resolution,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Session, Topic::Turn, Topic::Resolution];

    /// Topic a combat event is published on.
    pub fn of(event: &CombatEvent) -> Self {
        use CombatEvent::*;
        match event {
            CombatBegun { .. }
            | CombatantJoined { .. }
            | CombatantLeft { .. }
            | CombatEnded { .. } => Topic::Session,
            InitiativeRolled { .. }
            | RoundStarted { .. }
            | TurnStarted { .. }
            | TurnSkipped { .. }
            | ActionForfeited { .. } => Topic::Turn,
            _ => Topic::Resolution,
        }
    }
}

/// A combat event tagged with the location it happened at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub location: LocationId,
    pub event: CombatEvent,
}

impl Event {
    pub fn new(location: LocationId, event: CombatEvent) -> Self {
        Self { location, event }
    }

    pub fn topic(&self) -> Topic {
        Topic::of(&self.event)
    }

    /// JSON form for forwarding to external consumers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Topic-based event bus.
///
/// Consumers subscribe to the topics they care about. Publishing is
/// best-effort: events sent while a topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    session: broadcast::Sender<Event>,
    turn: broadcast::Sender<Event>,
    resolution: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            session: broadcast::channel(capacity).0,
            turn: broadcast::channel(capacity).0,
            resolution: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Session => &self.session,
            Topic::Turn => &self.turn,
            Topic::Resolution => &self.resolution,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!(target: "combat::runtime", ?topic, "no subscribers for topic");
        }
    }

    /// Publishes a batch of events from one location, preserving their order
    /// within each topic.
    pub fn publish_all(&self, location: LocationId, events: &[CombatEvent]) {
        for event in events {
            self.publish(Event::new(location, event.clone()));
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{EndReason, ParticipantId};

    fn location() -> LocationId {
        LocationId(7)
    }

    #[test]
    fn events_route_by_kind() {
        let begun = CombatEvent::CombatBegun {
            initiator: ParticipantId(1),
            combatants: vec![ParticipantId(1), ParticipantId(2)],
        };
        let turn = CombatEvent::TurnStarted {
            participant: ParticipantId(1),
            actions: 1,
        };
        let miss = CombatEvent::Missed {
            attacker: ParticipantId(1),
            target: ParticipantId(2),
        };
        assert_eq!(Topic::of(&begun), Topic::Session);
        assert_eq!(Topic::of(&turn), Topic::Turn);
        assert_eq!(Topic::of(&miss), Topic::Resolution);
    }

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut session_rx = bus.subscribe(Topic::Session);
        let mut turn_rx = bus.subscribe(Topic::Turn);

        bus.publish_all(
            location(),
            &[
                CombatEvent::TurnStarted {
                    participant: ParticipantId(1),
                    actions: 1,
                },
                CombatEvent::CombatEnded {
                    reason: EndReason::Requested,
                },
            ],
        );

        let ended = session_rx.recv().await.unwrap();
        assert_eq!(ended.location, location());
        assert!(matches!(ended.event, CombatEvent::CombatEnded { .. }));
        assert!(session_rx.try_recv().is_err());

        let started = turn_rx.recv().await.unwrap();
        assert_eq!(started.topic(), Topic::Turn);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(Event::new(
            location(),
            CombatEvent::CombatEnded {
                reason: EndReason::Requested,
            },
        ));
    }

    #[test]
    fn events_serialize_to_json() {
        let event = Event::new(
            location(),
            CombatEvent::Missed {
                attacker: ParticipantId(1),
                target: ParticipantId(2),
            },
        );
        let json = event.to_json().unwrap();
        assert!(json.contains("Missed"));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
