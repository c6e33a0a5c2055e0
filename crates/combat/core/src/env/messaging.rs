//! Delivery of human-readable combat text.

use std::sync::Mutex;

use crate::events::{Audience, CombatEvent};
use crate::state::{LocationId, ParticipantId};

/// Outbound text channel owned by the host (room broadcast, private notice).
///
/// Methods take `&self` so a single sink can be shared between sessions.
pub trait MessageSink {
    fn broadcast(&self, location: LocationId, text: &str);
    fn notify(&self, participant: ParticipantId, text: &str);
}

/// Routes each event to its audience.
pub fn deliver(location: LocationId, events: &[CombatEvent], sink: &dyn MessageSink) {
    for event in events {
        let text = event.to_string();
        match event.audience() {
            Audience::Location => sink.broadcast(location, &text),
            Audience::Participant(participant) => sink.notify(participant, &text),
        }
    }
}

/// A delivered message, as captured by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    Broadcast { location: LocationId, text: String },
    Notice { participant: ParticipantId, text: String },
}

impl Message {
    pub fn text(&self) -> &str {
        match self {
            Self::Broadcast { text, .. } | Self::Notice { text, .. } => text,
        }
    }
}

/// Sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<Message>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every message received so far.
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, message: Message) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message);
    }
}

impl MessageSink for RecordingSink {
    fn broadcast(&self, location: LocationId, text: &str) {
        self.record(Message::Broadcast {
            location,
            text: text.to_owned(),
        });
    }

    fn notify(&self, participant: ParticipantId, text: &str) {
        self.record(Message::Notice {
            participant,
            text: text.to_owned(),
        });
    }
}
